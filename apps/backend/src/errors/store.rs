//! Errors raised by the shared stores the gatekeeper talks to.

use thiserror::Error;

/// Failure of a counter or ownership store operation.
///
/// These are infrastructure failures; the gatekeeper surfaces them as
/// internal errors rather than letting the request through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store operation {op} failed: {detail}")]
    Operation { op: &'static str, detail: String },
}

impl StoreError {
    pub fn operation(op: &'static str, detail: impl Into<String>) -> Self {
        Self::Operation {
            op,
            detail: detail.into(),
        }
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
            StoreError::Unavailable(e.to_string())
        } else {
            StoreError::operation("redis", e.to_string())
        }
    }
}
