//! Errors from the ephemeral status cache.
//!
//! Every variant here means the same thing to a caller: "treat this as
//! unknown and fall back to the engine." Nothing in this crate is ever
//! allowed to fail a workflow.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusStoreError {
    #[error("status store connection error: {0}")]
    Connection(String),

    #[error("status store command error: {0}")]
    Command(String),

    #[error("status store serialization error: {0}")]
    Serialization(String),
}

impl From<redis::RedisError> for StatusStoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            Self::Connection(err.to_string())
        } else {
            Self::Command(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StatusStoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
