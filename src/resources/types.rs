//! Resource models
//!
//! Minimal typed views of the listed resources. Fields the client does not
//! model are kept in `extra`.

use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A customer profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

/// An invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default)]
    pub external_id: Option<String>,
    /// Amount in the currency's smallest unit
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

/// A charge against an e-wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EwalletCharge {
    pub id: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    /// Amount in the currency's smallest unit
    pub charge_amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub channel_code: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

/// A payout to a bank account or wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    /// Amount in the currency's smallest unit
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

/// A refund of an earlier payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Amount in the currency's smallest unit
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}
