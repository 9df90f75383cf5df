use super::*;
use axum::{body, body::Body, http::Request};
use tower::ServiceExt;

async fn post_orders(body: impl Into<Body>) -> (StatusCode, serde_json::Value) {
    let request = Request::post(ORDERS_ROUTE)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request");
    let response = build_router().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json"))
}

#[tokio::test]
async fn healthz_reports_ok() {
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = build_router().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn order_lookup_returns_demo_record() {
    let (status, body) =
        post_orders(serde_json::json!({ "orderNumber": "A-1001" }).to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let record: OrderRecord = serde_json::from_value(body).expect("record");
    assert_eq!(record.order_number, serde_json::json!("A-1001"));
    assert_eq!(record.customer_name, "John Doe");
    assert_eq!(record.status, "pending");
}

#[tokio::test]
async fn order_lookup_rejects_invalid_json() {
    let (status, body) = post_orders("not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Invalid JSON" }));
}

#[tokio::test]
async fn order_lookup_requires_order_number() {
    let (status, body) = post_orders(r#"{"order":"A-1001"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Missing orderNumber" }));
}

#[tokio::test]
async fn oversized_tool_body_is_refused() {
    let padding = "x".repeat(MAX_TOOL_BODY_BYTES + 1);
    let payload = format!(r#"{{"orderNumber":"{padding}"}}"#);
    let request = Request::post(ORDERS_ROUTE)
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .expect("request");
    let response = build_router().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
