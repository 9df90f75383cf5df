use super::*;
use serde_json::json;

#[test]
fn extracts_order_number_of_any_json_type() {
    let order = parse_order_lookup(br#"{"orderNumber":"A-1001"}"#).expect("order");
    assert_eq!(order, json!("A-1001"));

    let order = parse_order_lookup(br#"{"orderNumber":42,"extra":true}"#).expect("order");
    assert_eq!(order, json!(42));
}

#[test]
fn rejects_unparseable_or_null_body() {
    assert_eq!(
        parse_order_lookup(b"{orderNumber:"),
        Err(OrderLookupError::InvalidJson)
    );
    assert_eq!(parse_order_lookup(b""), Err(OrderLookupError::InvalidJson));
    assert_eq!(parse_order_lookup(b"null"), Err(OrderLookupError::InvalidJson));
}

#[test]
fn rejects_body_without_order_number() {
    assert_eq!(
        parse_order_lookup(br#"{"order":"A-1"}"#),
        Err(OrderLookupError::MissingOrderNumber)
    );
    assert_eq!(
        parse_order_lookup(br#"["orderNumber"]"#),
        Err(OrderLookupError::MissingOrderNumber)
    );
}

#[test]
fn lookup_echoes_order_number_into_demo_record() {
    let record = lookup_order(json!("A-1001"));
    assert_eq!(record.order_number, json!("A-1001"));
    assert_eq!(record.customer_name, "John Doe");
    assert_eq!(record.order_date, "2020-01-01");
    assert_eq!(record.total_amount, 100);
    assert_eq!(record.status, "pending");
    assert_eq!(record.shipping_address, "123 Main St, New York, NY 10030");
}
