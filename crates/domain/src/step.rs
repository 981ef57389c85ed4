//! `StepResult`: what an activity hands back on completion (§3).

use crate::status::{ErrorInfo, StepStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepResult {
    pub name: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    pub output: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl StepResult {
    pub fn completed(name: impl Into<String>, duration_ms: u64, output: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Completed,
            duration_ms,
            output,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, duration_ms: u64, error: ErrorInfo) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Failed,
            duration_ms,
            output: serde_json::Value::Null,
            error: Some(error),
        }
    }
}
