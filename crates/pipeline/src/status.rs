//! Engine-state <-> domain-state mapping (SPEC_FULL.md §4.4.1).
//!
//! The durable engine only knows `Pending | Running | Completed | Failed |
//! Cancelled` — replay bookkeeping, not product semantics. This module is
//! the single place that translates between the two, and builds a
//! `WorkflowStatusRecord` from the engine's authoritative `WorkflowInfo`
//! when the Status Store has nothing cached (cold cache, TTL expiry, or a
//! Redis outage).

use chrono::{DateTime, Utc};

use onboard_domain::{ErrorInfo, Progress, WorkflowState, WorkflowStatusRecord};
use onboard_durable::persistence::WorkflowInfo;
use onboard_durable::WorkflowStatus as EngineStatus;

/// Map the engine's execution-state enum onto the product-facing one.
///
/// `Cancelled` is not reachable in Phase-1 (nothing issues a cancel) but is
/// kept mapped to `Failed` for completeness, matching the table's own note.
pub fn domain_state(engine_status: EngineStatus) -> WorkflowState {
    match engine_status {
        EngineStatus::Pending => WorkflowState::Queued,
        EngineStatus::Running => WorkflowState::Processing,
        EngineStatus::Completed => WorkflowState::Ready,
        EngineStatus::Failed | EngineStatus::Cancelled => WorkflowState::Failed,
    }
}

/// Build a status record straight from engine state, for when the Status
/// Store has no cached record (or failed to answer). `queued_at` can't be
/// recovered from `WorkflowInfo` (the engine doesn't track wall-clock
/// timestamps on that struct), so the caller's own observation time is used
/// — acceptable here since the engine is authoritative for *state*, and the
/// Status Store is where accurate step timing lives when it's available.
pub fn from_engine_info(info: &WorkflowInfo, observed_at: DateTime<Utc>) -> WorkflowStatusRecord {
    let state = domain_state(info.status);

    let role_id = info
        .result
        .as_ref()
        .and_then(|r| r.get("company_role_id"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let error = info.error.as_ref().map(|e| ErrorInfo {
        code: e.code.clone().unwrap_or_else(|| "EXECUTION_ERROR".to_string()),
        message: e.message.clone(),
        recoverable: e.retryable,
    });

    WorkflowStatusRecord {
        workflow_id: info.id,
        state,
        current_step: None,
        progress: Progress::new_role_onboarding(),
        queued_at: observed_at,
        started_at: None,
        completed_at: if state.is_terminal() {
            Some(observed_at)
        } else {
            None
        },
        role_id,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_engine_state() {
        assert_eq!(domain_state(EngineStatus::Pending), WorkflowState::Queued);
        assert_eq!(
            domain_state(EngineStatus::Running),
            WorkflowState::Processing
        );
        assert_eq!(domain_state(EngineStatus::Completed), WorkflowState::Ready);
        assert_eq!(domain_state(EngineStatus::Failed), WorkflowState::Failed);
        assert_eq!(
            domain_state(EngineStatus::Cancelled),
            WorkflowState::Failed
        );
    }
}
