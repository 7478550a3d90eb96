use super::*;
use crate::test_support::{json_response, unthrottled_client, MockTransport};
use chrono::{TimeZone, Utc};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;

fn invoice(n: usize) -> serde_json::Value {
    json!({
        "id": format!("inv_{n}"),
        "external_id": format!("order-{n}"),
        "amount": 150_000,
        "currency": "IDR",
        "status": "PAID",
        "created": "2024-03-01T08:30:00Z",
        "merchant_name": "Acme"
    })
}

#[test]
fn test_models_keep_unknown_fields() {
    let invoice: Invoice = serde_json::from_value(invoice(1)).unwrap();
    assert_eq!(invoice.id, "inv_1");
    assert_eq!(invoice.amount, 150_000);
    assert_eq!(
        invoice.created,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap())
    );
    assert_eq!(invoice.extra.get("merchant_name"), Some(&json!("Acme")));

    let customer: Customer = serde_json::from_value(json!({"id": "cus_1"})).unwrap();
    assert_eq!(customer.email, None);
    assert!(customer.extra.is_empty());
}

#[test]
fn test_model_missing_required_field() {
    let result: std::result::Result<Payout, _> =
        serde_json::from_value(json!({"id": "po_1", "currency": "IDR", "status": "PENDING"}));
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_listing_paths() {
    let transport = MockTransport::new(|_, _| {
        Ok(json_response(200, &json!({"data": [], "has_more": false})))
    });
    let client = unthrottled_client(transport.clone());

    assert!(client.customers().list(&PageOptions::new()).await.unwrap().is_empty());
    assert!(client.invoices().list(&PageOptions::new()).await.unwrap().is_empty());
    assert!(client.ewallet_charges().list(&PageOptions::new()).await.unwrap().is_empty());
    assert!(client.payouts().list(&PageOptions::new()).await.unwrap().is_empty());
    assert!(client.refunds().list(&PageOptions::new()).await.unwrap().is_empty());

    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            "https://api.test/customers",
            "https://api.test/invoices",
            "https://api.test/ewallets/charges",
            "https://api.test/payouts",
            "https://api.test/refunds",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_invoices_list_all_follows_cursor() {
    let transport = MockTransport::new(|_, request| {
        let body = match request.query_value("after_id") {
            None => json!({"data": [invoice(1), invoice(2)], "has_more": true, "after_id": "inv_2"}),
            Some("inv_2") => json!({"data": [invoice(3)], "has_more": false}),
            Some(other) => panic!("unexpected cursor {other}"),
        };
        Ok(json_response(200, &body))
    });
    let client = unthrottled_client(transport.clone());

    let invoices = client
        .invoices()
        .list_all(ListOptions::new().limit(2))
        .await
        .unwrap();
    let ids: Vec<&str> = invoices.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["inv_1", "inv_2", "inv_3"]);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_items_stream_and_paginator() {
    let transport = MockTransport::new(|_, request| {
        let body = match request.query_value("after_id") {
            None => json!({"data": [invoice(1)], "has_more": true, "after_id": "inv_1"}),
            Some(_) => json!({"data": [invoice(2)], "has_more": false}),
        };
        Ok(json_response(200, &body))
    });
    let client = unthrottled_client(transport.clone());
    let invoices = client.invoices();

    let streamed: Vec<Invoice> = invoices.items(ListOptions::new()).try_collect().await.unwrap();
    assert_eq!(streamed.len(), 2);

    let pages: Vec<Page<Invoice>> = invoices.pages(ListOptions::new()).try_collect().await.unwrap();
    assert_eq!(pages.len(), 2);

    let mut paginator = invoices.paginator(ListOptions::new());
    assert_eq!(paginator.collect_all().await.unwrap(), streamed);
    paginator.reset();
    assert_eq!(paginator.collect_all().await.unwrap().len(), 2);
    assert_eq!(transport.calls(), 8);
}

#[tokio::test(start_paused = true)]
async fn test_retrieve_by_id() {
    let transport = MockTransport::new(|_, _| Ok(json_response(200, &invoice(7))));
    let client = unthrottled_client(transport.clone());

    let invoice = client.invoices().retrieve("inv_7").await.unwrap();
    assert_eq!(invoice.external_id.as_deref(), Some("order-7"));
    assert_eq!(transport.requests()[0].url, "https://api.test/invoices/inv_7");
}

#[tokio::test(start_paused = true)]
async fn test_retrieve_not_found() {
    let transport = MockTransport::new(|_, _| {
        Ok(json_response(404, &json!({"error_code": "DATA_NOT_FOUND"})))
    });
    let client = unthrottled_client(transport.clone());

    let err = client.refunds().retrieve("rfd_missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(transport.calls(), 1);
}
