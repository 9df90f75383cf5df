use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the HTTP tools, `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderLookupError {
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Missing orderNumber")]
    MissingOrderNumber,
}

impl From<OrderLookupError> for ApiError {
    fn from(value: OrderLookupError) -> Self {
        Self::new(value.to_string())
    }
}
