use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field the assistant tool call carries the order reference in.
pub const ORDER_NUMBER_FIELD: &str = "orderNumber";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_number: Value,
    pub customer_name: String,
    pub order_date: String,
    pub total_amount: u64,
    pub status: String,
    pub shipping_address: String,
}
