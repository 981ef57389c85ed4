//! Failure classification for the downstream processing API.
//!
//! The client never retries; it only classifies. `retryable()` is what
//! activities read to decide how to report the failure to the engine.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DownstreamError {
    /// Network failure, connection reset, or HTTP 5xx — safe to retry.
    #[error("downstream transient error: {message}")]
    Transient { message: String },

    /// HTTP 4xx — the request itself is bad and retrying won't help.
    #[error("downstream permanent error ({status}): {message}")]
    Permanent { status: u16, message: String },

    /// The request exceeded its per-call timeout.
    #[error("downstream request timed out: {message}")]
    Timeout { message: String },

    /// The response body didn't match the expected shape.
    #[error("downstream response decode error: {message}")]
    Decode { message: String },
}

impl DownstreamError {
    /// Whether the engine should retry the activity that produced this error.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Timeout { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Permanent { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status.is_server_error() {
            Self::Transient {
                message: format!("HTTP {}: {}", status.as_u16(), body),
            }
        } else {
            Self::Permanent {
                status: status.as_u16(),
                message: body,
            }
        }
    }
}

impl From<reqwest::Error> for DownstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                message: err.to_string(),
            }
        } else if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::Transient {
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_and_timeout_are_retryable() {
        assert!(DownstreamError::Transient { message: "x".into() }.retryable());
        assert!(DownstreamError::Timeout { message: "x".into() }.retryable());
    }

    #[test]
    fn permanent_and_decode_are_not_retryable() {
        assert!(!DownstreamError::Permanent { status: 422, message: "x".into() }.retryable());
        assert!(!DownstreamError::Decode { message: "x".into() }.retryable());
    }

    #[test]
    fn from_status_splits_on_5xx_vs_4xx() {
        let server_err = DownstreamError::from_status(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            "down".into(),
        );
        assert!(server_err.retryable());

        let client_err =
            DownstreamError::from_status(reqwest::StatusCode::BAD_REQUEST, "bad".into());
        assert!(!client_err.retryable());
        assert_eq!(client_err.status(), Some(400));
    }
}
