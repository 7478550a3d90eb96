//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → governor → reqwest → paginated listing

use futures::TryStreamExt;
use paygate::governor::GovernorConfig;
use paygate::http::HttpClient;
use paygate::pagination::{fetch_all_pages, iterate_items, ListOptions, PageOptions};
use paygate::{ClientConfig, Error, GovernorEvent, Invoice};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn invoice(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "amount": 50_000,
        "currency": "PHP",
        "status": "PENDING"
    })
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base_url(server.uri())
        .secret_key("sk_test")
        .retry_delays(Duration::from_millis(10), Duration::from_millis(50))
        .build()
}

async fn mount_invoice_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/invoices"))
        .and(query_param_is_missing("after_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [invoice("inv_1"), invoice("inv_2")],
            "has_more": true,
            "after_id": "inv_2"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices"))
        .and(query_param("after_id", "inv_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [invoice("inv_3"), invoice("inv_4")],
            "has_more": true,
            "after_id": "inv_4"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/invoices"))
        .and(query_param("after_id", "inv_4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [invoice("inv_5")],
            "has_more": false
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Pagination Integration Tests
// ============================================================================

#[tokio::test]
async fn test_list_all_invoices_over_http() {
    let server = MockServer::start().await;
    mount_invoice_pages(&server).await;

    let client = HttpClient::new(config_for(&server)).unwrap();
    let invoices = client
        .invoices()
        .list_all(ListOptions::new().limit(2))
        .await
        .unwrap();

    let ids: Vec<&str> = invoices.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["inv_1", "inv_2", "inv_3", "inv_4", "inv_5"]);
    assert!(invoices.iter().all(|i| i.currency == "PHP"));
}

#[tokio::test]
async fn test_item_stream_over_http() {
    let server = MockServer::start().await;
    mount_invoice_pages(&server).await;

    let client = HttpClient::new(config_for(&server)).unwrap();
    let items: Vec<Invoice> = iterate_items(&client, "/invoices", ListOptions::new())
        .try_collect()
        .await
        .unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[4].id, "inv_5");
}

#[tokio::test]
async fn test_first_page_only_with_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers"))
        .and(query_param("limit", "1"))
        .and(header("Authorization", "Basic c2tfdGVzdDo="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "cus_1", "email": "a@example.com"}],
            "has_more": true,
            "after_id": "cus_1",
            "total_count": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(config_for(&server)).unwrap();
    let page = client
        .customers()
        .list(&PageOptions::new().limit(1))
        .await
        .unwrap();
    assert_eq!(page.data[0].email.as_deref(), Some("a@example.com"));
    assert_eq!(page.next_cursor(), Some("cus_1"));
    assert_eq!(page.total_count, Some(12));
}

#[tokio::test]
async fn test_cursorless_page_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/refunds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(config_for(&server)).unwrap();
    let err = client
        .refunds()
        .list_all(ListOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_protocol_violation());
}

#[tokio::test]
async fn test_server_error_is_retried_mid_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/payouts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "po_1", "amount": 10, "currency": "IDR", "status": "COMPLETED"}],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(config_for(&server)).unwrap();
    let payouts = fetch_all_pages::<serde_json::Value>(&client, "/payouts", ListOptions::new())
        .await
        .unwrap();
    assert_eq!(payouts.len(), 1);
}

// ============================================================================
// Governor Integration Tests
// ============================================================================

#[tokio::test]
async fn test_rate_limited_request_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ewallets/charges"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ewallets/charges"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "0")
                .set_body_json(json!({"data": [], "has_more": false})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let events: Arc<Mutex<Vec<GovernorEvent>>> = Arc::default();
    let recorded = events.clone();
    let client = HttpClient::builder(config_for(&server))
        .event_sink(Arc::new(move |event: &GovernorEvent| {
            recorded.lock().unwrap().push(event.clone());
        }))
        .build()
        .unwrap();

    let page = client
        .ewallet_charges()
        .list(&PageOptions::new())
        .await
        .unwrap();
    assert!(page.is_empty());

    let events = events.lock().unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        GovernorEvent::RateLimited { from_header: false, delay, .. }
            if *delay == Duration::from_millis(10)
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e, GovernorEvent::QuotaExhausted { .. })));
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .governor(
            GovernorConfig::new(10, Duration::from_secs(1)).retries(
                2,
                Duration::from_millis(10),
                Duration::from_millis(20),
            ),
        )
        .build();
    let client = HttpClient::new(config).unwrap();

    let err = client
        .customers()
        .list(&PageOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: Some(0)
        }
    ));
}

#[tokio::test]
async fn test_bucket_spaces_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/refunds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "has_more": false
        })))
        .expect(3)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(server.uri())
        .governor(GovernorConfig::new(2, Duration::from_millis(200)))
        .build();
    let client = HttpClient::new(config).unwrap();

    let start = std::time::Instant::now();
    for _ in 0..3 {
        client.refunds().list(&PageOptions::new()).await.unwrap();
    }
    // third request waits for one token: 200ms / 2
    assert!(start.elapsed() >= Duration::from_millis(90));
}

// ============================================================================
// Config Integration Tests
// ============================================================================

#[tokio::test]
async fn test_client_from_yaml_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/invoices/inv_9"))
        .and(header("Authorization", "Bearer tok_123"))
        .and(header("x-tenant", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(invoice("inv_9")))
        .expect(1)
        .mount(&server)
        .await;

    let yaml = format!(
        r"
base_url: {}
credentials:
  type: bearer
  token: tok_123
default_headers:
  x-tenant: acme
governor:
  max_requests: 5
  window_ms: 1000
",
        server.uri()
    );
    let config = ClientConfig::from_yaml_str(&yaml).unwrap();
    let client = HttpClient::new(config).unwrap();

    let invoice = client.invoices().retrieve("inv_9").await.unwrap();
    assert_eq!(invoice.amount, 50_000);
}
