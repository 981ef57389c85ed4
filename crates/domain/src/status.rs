//! Product-facing `WorkflowStatus` (§3): what a caller of `/status` sees.
//!
//! This is distinct from the durable engine's own execution-state enum
//! (`Pending | Running | Completed | Failed | Cancelled`), which tracks
//! replay/scheduling progress rather than product semantics. `onboard-pipeline`
//! owns the mapping between the two (see SPEC_FULL.md §4.4.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Terminal and non-terminal states of a role onboarding workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Queued,
    Processing,
    Ready,
    Failed,
    /// Reserved: all required steps completed but an optional step failed.
    /// Phase-1 has no optional steps, so this is never emitted by the
    /// workflow itself; it only exists so the state machine's shape matches
    /// the full transition table.
    Degraded,
    ValidationError,
    Stale,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Failed | Self::Degraded | Self::ValidationError
        )
    }
}

/// Status of one of the two top-level workflow steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepProgress {
    pub name: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StepProgress {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
    pub steps: Vec<StepProgress>,
}

impl Progress {
    /// Fresh progress tracker for the fixed two-step `RoleOnboarding` workflow.
    pub fn new_role_onboarding() -> Self {
        Self {
            current: 0,
            total: 2,
            steps: vec![
                StepProgress::pending("role_setup"),
                StepProgress::pending("ai_assessment"),
            ],
        }
    }
}

/// Terminal error detail, present only once a workflow reaches a failed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    pub recoverable: bool,
}

/// Full, mutable, append-only status record for one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkflowStatusRecord {
    pub workflow_id: Uuid,
    pub state: WorkflowState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    pub progress: Progress,
    pub queued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl WorkflowStatusRecord {
    pub fn queued(workflow_id: Uuid, queued_at: DateTime<Utc>) -> Self {
        Self {
            workflow_id,
            state: WorkflowState::Queued,
            current_step: None,
            progress: Progress::new_role_onboarding(),
            queued_at,
            started_at: None,
            completed_at: None,
            role_id: None,
            error: None,
        }
    }

    pub fn validation_error(workflow_id: Uuid, queued_at: DateTime<Utc>, error: ErrorInfo) -> Self {
        Self {
            workflow_id,
            state: WorkflowState::ValidationError,
            current_step: None,
            progress: Progress::new_role_onboarding(),
            queued_at,
            started_at: None,
            completed_at: Some(queued_at),
            role_id: None,
            error: Some(error),
        }
    }
}
