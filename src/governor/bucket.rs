//! Continuous token bucket
//!
//! Capacity accrues proportionally to elapsed time and fractional tokens
//! carry over between checks. Every admitted request costs exactly one
//! token.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Absorbs float drift when a waiter wakes exactly at the refill boundary
const EPSILON: f64 = 1e-9;

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket admitting `capacity` requests per `refill_window`
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_window: Duration,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket
    ///
    /// A zero capacity or window is raised to the smallest usable value.
    pub fn new(capacity: u32, refill_window: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        let refill_window = refill_window.max(Duration::from_millis(1));
        Self {
            capacity,
            refill_window,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Maximum number of tokens
    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    /// Time for an empty bucket to refill
    pub fn refill_window(&self) -> Duration {
        self.refill_window
    }

    /// Current token count after refilling
    pub fn tokens(&self) -> f64 {
        let mut state = self.lock();
        self.refill(&mut state);
        state.tokens
    }

    /// Refill, then report whether a token is available
    pub fn can_consume(&self) -> bool {
        let mut state = self.lock();
        self.refill(&mut state);
        state.tokens + EPSILON >= 1.0
    }

    /// Refill, then take one token if available
    ///
    /// Refill, check and decrement happen under one lock, so two callers
    /// can never spend the same token.
    pub fn consume(&self) -> bool {
        let mut state = self.lock();
        self.refill(&mut state);
        if state.tokens + EPSILON >= 1.0 {
            state.tokens = (state.tokens - 1.0).max(0.0);
            true
        } else {
            false
        }
    }

    /// Time until one more token accrues, zero if one is available now
    pub fn wait_time(&self) -> Duration {
        let mut state = self.lock();
        self.refill(&mut state);
        self.wait_for(state.tokens)
    }

    /// Sleep until a token should be available
    ///
    /// Does not reserve the token; another task may take it first.
    pub async fn await_admission(&self) {
        let wait = self.wait_time();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Wait for and consume one token, returning the time spent waiting
    ///
    /// No FIFO ordering between competing callers. Dropping the future
    /// before it resolves consumes nothing.
    pub async fn acquire(&self) -> Duration {
        let start = Instant::now();
        loop {
            self.await_admission().await;
            if self.consume() {
                return start.elapsed();
            }
        }
    }

    fn wait_for(&self, tokens: f64) -> Duration {
        if tokens + EPSILON >= 1.0 {
            return Duration::ZERO;
        }
        let deficit = 1.0 - tokens;
        Duration::from_secs_f64(deficit / self.capacity * self.refill_window.as_secs_f64())
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.last_refill);
        let accrued = elapsed.as_secs_f64() / self.refill_window.as_secs_f64() * self.capacity;
        state.tokens = (state.tokens + accrued).min(self.capacity);
        state.last_refill = now;
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
