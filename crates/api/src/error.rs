//! `PipelineApiError`: the `{"detail": {...}}` envelope every route returns
//! on failure (§4.5, §7) — `{"error", "message", "recoverable"}` nested
//! under `detail`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use onboard_domain::DomainError;
use onboard_downstream::DownstreamError;
use onboard_durable::ExecutorError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub error: String,
    pub message: String,
    pub recoverable: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: ErrorDetail,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineApiError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("engine or downstream unreachable: {0}")]
    Temporal(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Temporal(_) => "TEMPORAL_ERROR",
            Self::Execution(_) => "EXECUTION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Temporal(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Execution(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn recoverable(&self) -> bool {
        matches!(self, Self::Temporal(_) | Self::Internal(_))
    }
}

impl IntoResponse for PipelineApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            detail: ErrorDetail {
                error: self.code().to_string(),
                message: self.to_string(),
                recoverable: self.recoverable(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for PipelineApiError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<DownstreamError> for PipelineApiError {
    fn from(err: DownstreamError) -> Self {
        match err {
            DownstreamError::Timeout { message } => Self::Temporal(message),
            DownstreamError::Transient { message } => Self::Temporal(message),
            DownstreamError::Permanent { message, .. } => Self::Execution(message),
            DownstreamError::Decode { message } => Self::Internal(message),
        }
    }
}

impl From<ExecutorError> for PipelineApiError {
    fn from(err: ExecutorError) -> Self {
        match err {
            ExecutorError::WorkflowNotFound(id) => Self::NotFound(format!("workflow {id} not found")),
            ExecutorError::Store(store_err) => store_err.into(),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<onboard_status::StatusStoreError> for PipelineApiError {
    fn from(err: onboard_status::StatusStoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<onboard_durable::persistence::StoreError> for PipelineApiError {
    fn from(err: onboard_durable::persistence::StoreError) -> Self {
        match err {
            onboard_durable::persistence::StoreError::WorkflowNotFound(id) => {
                Self::NotFound(format!("workflow {id} not found"))
            }
            onboard_durable::persistence::StoreError::TaskNotFound(id) => {
                Self::NotFound(format!("task {id} not found"))
            }
            // Connectivity failure against the durable-execution backend —
            // §7 classes "engine unreachable" as transient, and §4.5's push
            // row mandates 503 for this case, not a bare 500.
            onboard_durable::persistence::StoreError::Database(message) => Self::Temporal(message),
            other => Self::Internal(other.to_string()),
        }
    }
}
