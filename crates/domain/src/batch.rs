//! Batch bookkeeping (§3, §8): a pure record of workflow IDs pushed together.
//!
//! A batch is not a parent workflow and has no engine presence of its own —
//! `onboard-pipeline` pushes N independent `RoleOnboarding` workflows and
//! `onboard-status` records which workflow IDs belong to which batch so
//! `/batch-status` can fan out and aggregate.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::status::WorkflowState;

/// Durable record of one `/push-batch` call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchRecord {
    pub batch_id: Uuid,
    pub company_id: String,
    pub workflow_ids: Vec<Uuid>,
    /// Role name pushed for each workflow, keyed by workflow ID. Neither the
    /// engine's `WorkflowInfo` nor `WorkflowStatusRecord` carry the role name
    /// on their own, and `/batch-status` needs it for every `RoleSummary`.
    #[serde(default)]
    pub role_names: HashMap<Uuid, String>,
    pub total_roles: u32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl BatchRecord {
    pub fn new(
        company_id: impl Into<String>,
        workflow_ids: Vec<Uuid>,
        role_names: HashMap<Uuid, String>,
        created_at: DateTime<Utc>,
        created_by: Option<String>,
    ) -> Self {
        let total_roles = workflow_ids.len() as u32;
        Self {
            batch_id: Uuid::now_v7(),
            company_id: company_id.into(),
            workflow_ids,
            role_names,
            total_roles,
            created_at,
            created_by,
        }
    }
}

/// Coarse aggregate state of a batch, derived from its roles' states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Queued,
    InProgress,
    Completed,
}

/// One role's contribution to a batch status response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleSummary {
    pub workflow_id: Uuid,
    pub role_name: String,
    pub status: WorkflowState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

/// Computed aggregation served by `GET /batch-status/{batch_id}`.
///
/// Invariant: `queued + in_progress + completed + failed == total`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchStatus {
    pub batch_id: Uuid,
    pub company_id: String,
    pub total: u32,
    pub queued: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub failed: u32,
    pub state: BatchState,
    pub progress_percent: f64,
    pub success_rate: f64,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<RoleSummary>,
}

impl BatchStatus {
    /// Aggregate a batch record's roles into a `BatchStatus`.
    ///
    /// `roles` must carry one entry per `workflow_id` in `record`, in any
    /// order; this function does not validate that correspondence.
    pub fn aggregate(record: &BatchRecord, roles: Vec<RoleSummary>) -> Self {
        let total = record.total_roles;
        let mut queued = 0u32;
        let mut in_progress = 0u32;
        let mut completed = 0u32;
        let mut failed = 0u32;

        for role in &roles {
            match role.status {
                WorkflowState::Queued => queued += 1,
                WorkflowState::Processing => in_progress += 1,
                WorkflowState::Ready => completed += 1,
                WorkflowState::Failed
                | WorkflowState::Degraded
                | WorkflowState::ValidationError
                | WorkflowState::Stale => failed += 1,
            }
        }

        let finished = completed + failed;
        let state = if finished == 0 {
            BatchState::Queued
        } else if finished < total {
            BatchState::InProgress
        } else {
            BatchState::Completed
        };

        let progress_percent = if total == 0 {
            0.0
        } else {
            (finished as f64 / total as f64) * 100.0
        };
        let success_rate = if finished == 0 {
            0.0
        } else {
            (completed as f64 / finished as f64) * 100.0
        };

        Self {
            batch_id: record.batch_id,
            company_id: record.company_id.clone(),
            total,
            queued,
            in_progress,
            completed,
            failed,
            state,
            progress_percent,
            success_rate,
            created_at: record.created_at,
            roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(status: WorkflowState) -> RoleSummary {
        RoleSummary {
            workflow_id: Uuid::now_v7(),
            role_name: "Claims Adjuster".into(),
            status,
            error: None,
            dashboard_url: None,
        }
    }

    #[test]
    fn new_batch_total_matches_workflow_count() {
        let ids = vec![Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()];
        let record = BatchRecord::new("acme", ids.clone(), HashMap::new(), Utc::now(), None);
        assert_eq!(record.total_roles, ids.len() as u32);
    }

    #[test]
    fn aggregate_all_queued_is_queued_state() {
        let record = BatchRecord::new(
            "acme",
            vec![Uuid::now_v7(), Uuid::now_v7()],
            HashMap::new(),
            Utc::now(),
            None,
        );
        let roles = vec![role(WorkflowState::Queued), role(WorkflowState::Queued)];
        let status = BatchStatus::aggregate(&record, roles);

        assert_eq!(status.state, BatchState::Queued);
        assert_eq!(status.queued + status.in_progress + status.completed + status.failed, status.total);
        assert_eq!(status.progress_percent, 0.0);
    }

    #[test]
    fn aggregate_mixed_is_in_progress() {
        let record = BatchRecord::new(
            "acme",
            vec![Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()],
            HashMap::new(),
            Utc::now(),
            None,
        );
        let roles = vec![
            role(WorkflowState::Ready),
            role(WorkflowState::Processing),
            role(WorkflowState::Queued),
        ];
        let status = BatchStatus::aggregate(&record, roles);

        assert_eq!(status.state, BatchState::InProgress);
        assert_eq!(status.completed, 1);
        assert!((status.progress_percent - 33.333333333333336).abs() < 1e-9);
    }

    #[test]
    fn aggregate_all_finished_is_completed_with_success_rate() {
        let record = BatchRecord::new(
            "acme",
            vec![Uuid::now_v7(), Uuid::now_v7()],
            HashMap::new(),
            Utc::now(),
            None,
        );
        let roles = vec![role(WorkflowState::Ready), role(WorkflowState::Failed)];
        let status = BatchStatus::aggregate(&record, roles);

        assert_eq!(status.state, BatchState::Completed);
        assert_eq!(status.progress_percent, 100.0);
        assert_eq!(status.success_rate, 50.0);
    }
}
