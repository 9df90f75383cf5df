//! Order lookup tool the voice assistant calls mid-conversation.

use serde_json::Value;
use shared::{
    error::OrderLookupError,
    protocol::{OrderRecord, ORDER_NUMBER_FIELD},
};

pub const ORDERS_ROUTE: &str = "/orders";

const DEMO_CUSTOMER_NAME: &str = "John Doe";
const DEMO_ORDER_DATE: &str = "2020-01-01";
const DEMO_TOTAL_AMOUNT: u64 = 100;
const DEMO_ORDER_STATUS: &str = "pending";
const DEMO_SHIPPING_ADDRESS: &str = "123 Main St, New York, NY 10030";

/// Pulls the order number out of a tool-call body. JSON `null` counts as no
/// JSON at all; any other non-object has no order number.
pub fn parse_order_lookup(body: &[u8]) -> Result<Value, OrderLookupError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|_| OrderLookupError::InvalidJson)?;

    match payload {
        Value::Null => Err(OrderLookupError::InvalidJson),
        Value::Object(mut fields) => fields
            .remove(ORDER_NUMBER_FIELD)
            .ok_or(OrderLookupError::MissingOrderNumber),
        _ => Err(OrderLookupError::MissingOrderNumber),
    }
}

pub fn lookup_order(order_number: Value) -> OrderRecord {
    OrderRecord {
        order_number,
        customer_name: DEMO_CUSTOMER_NAME.into(),
        order_date: DEMO_ORDER_DATE.into(),
        total_amount: DEMO_TOTAL_AMOUNT,
        status: DEMO_ORDER_STATUS.into(),
        shipping_address: DEMO_SHIPPING_ADDRESS.into(),
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
