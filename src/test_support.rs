//! Scripted transport for unit tests

use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpClient, Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Handler = dyn Fn(usize, &TransportRequest) -> Result<TransportResponse> + Send + Sync;

/// Transport answering each call from a closure and recording the requests
pub struct MockTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    /// `handler` receives the zero-based call index and the request
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(usize, &TransportRequest) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        (self.handler)(index, &request)
    }
}

/// A JSON response
pub fn json_response(status: u16, body: &Value) -> TransportResponse {
    TransportResponse::new(status, serde_json::to_vec(body).unwrap())
}

/// A page body with items `{"id": "item_<n>"}` for `n` in `ids`
pub fn page_body(ids: std::ops::Range<usize>, has_more: bool, after_id: Option<&str>) -> Value {
    let data: Vec<Value> = ids.map(|n| json!({ "id": format!("item_{n}") })).collect();
    let mut body = json!({ "data": data, "has_more": has_more });
    if let Some(after_id) = after_id {
        body["after_id"] = json!(after_id);
    }
    body
}

/// Client over `transport` with the bucket disabled
pub fn unthrottled_client(transport: Arc<MockTransport>) -> HttpClient {
    let config = ClientConfig::builder()
        .base_url("https://api.test")
        .no_rate_limit()
        .build();
    HttpClient::with_transport(config, transport).unwrap()
}
