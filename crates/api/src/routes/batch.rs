//! `POST /push-batch`, `GET /batch-status/{batch_id}`, `POST
//! /retry-failed/{batch_id}` (§4.5, §6).

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use onboard_domain::{BatchRecord, BatchStatus, DocumentRef, OnboardingOptions, RoleSummary};

use crate::error::PipelineApiError;
use crate::routes::push::build_input;
use crate::state::{get_status, start_workflow, AppState};

const ESTIMATED_DURATION_SECONDS: u64 = 600;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BatchRoleRequest {
    pub role_name: String,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draup_role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draup_role_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PushBatchRequest {
    pub company_id: String,
    pub roles: Vec<BatchRoleRequest>,
    #[serde(default)]
    pub options: OnboardingOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PushBatchResponse {
    pub batch_id: Uuid,
    pub total_roles: u32,
    pub workflow_ids: Vec<Uuid>,
    pub status: &'static str,
    pub estimated_duration_seconds: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RetryFailedRequest {
    pub workflow_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RetryFailedResponse {
    pub batch_id: Uuid,
    pub workflow_ids: Vec<Uuid>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/push-batch", post(push_batch))
        .route("/batch-status/:batch_id", get(batch_status))
        .route("/retry-failed/:batch_id", post(retry_failed))
        .with_state(state)
}

async fn save_batch(state: &AppState, record: &BatchRecord) {
    state.batches.insert(record.batch_id, record.clone());
    if let Some(store) = &state.status_store {
        if let Err(e) = store.set_batch(record.batch_id, record).await {
            tracing::warn!(batch_id = %record.batch_id, error = %e, "failed to persist batch record");
        }
    }
}

async fn load_batch(state: &AppState, batch_id: Uuid) -> Option<BatchRecord> {
    if let Some(store) = &state.status_store {
        if let Ok(Some(record)) = store.get_batch(batch_id).await {
            return Some(record);
        }
    }
    state.batches.get(&batch_id).map(|r| r.clone())
}

#[utoipa::path(
    post,
    path = "/push-batch",
    request_body = PushBatchRequest,
    responses(
        (status = 200, description = "Batch enqueued", body = PushBatchResponse),
    ),
    tag = "pipeline"
)]
pub async fn push_batch(
    State(state): State<AppState>,
    Json(req): Json<PushBatchRequest>,
) -> Result<Json<PushBatchResponse>, PipelineApiError> {
    let mut workflow_ids = Vec::new();
    let mut role_names = HashMap::new();
    let mut failures = Vec::new();

    for role in req.roles {
        let input = build_input(
            &state,
            req.company_id.clone(),
            role.role_name.clone(),
            role.documents,
            role.draup_role_id,
            role.draup_role_name,
            req.options.clone(),
        )
        .await;

        let input = match input {
            Ok(input) => input,
            Err(e) => {
                failures.push(format!("{}: {}", role.role_name, e));
                continue;
            }
        };

        match start_workflow(&state, input).await {
            Ok(workflow_id) => {
                role_names.insert(workflow_id, role.role_name);
                workflow_ids.push(workflow_id);
            }
            Err(e) => failures.push(format!("{}: {}", role.role_name, e)),
        }
    }

    let record = BatchRecord::new(
        req.company_id,
        workflow_ids.clone(),
        role_names,
        Utc::now(),
        req.created_by,
    );
    save_batch(&state, &record).await;

    let message = if failures.is_empty() {
        "batch enqueued".to_string()
    } else {
        format!(
            "{} of {} roles enqueued; failures: {}",
            workflow_ids.len(),
            workflow_ids.len() + failures.len(),
            failures.join("; ")
        )
    };

    Ok(Json(PushBatchResponse {
        batch_id: record.batch_id,
        total_roles: record.total_roles,
        workflow_ids: record.workflow_ids,
        status: "queued",
        estimated_duration_seconds: ESTIMATED_DURATION_SECONDS,
        message,
    }))
}

async fn aggregate(state: &AppState, record: &BatchRecord) -> BatchStatus {
    let mut roles = Vec::with_capacity(record.workflow_ids.len());
    for workflow_id in &record.workflow_ids {
        let role_name = record
            .role_names
            .get(workflow_id)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let summary = match get_status(state, *workflow_id).await {
            Ok(status) => RoleSummary {
                workflow_id: *workflow_id,
                role_name,
                status: status.state,
                error: status.error.map(|e| e.message),
                dashboard_url: None,
            },
            Err(_) => RoleSummary {
                workflow_id: *workflow_id,
                role_name,
                status: onboard_domain::WorkflowState::Failed,
                error: Some("workflow unknown to engine and status store".to_string()),
                dashboard_url: None,
            },
        };
        roles.push(summary);
    }

    BatchStatus::aggregate(record, roles)
}

#[utoipa::path(
    get,
    path = "/batch-status/{batch_id}",
    params(("batch_id" = Uuid, Path, description = "Batch id returned by /push-batch")),
    responses(
        (status = 200, description = "Aggregated batch status", body = BatchStatus),
        (status = 404, description = "Unknown batch"),
    ),
    tag = "pipeline"
)]
pub async fn batch_status(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<BatchStatus>, PipelineApiError> {
    let record = load_batch(&state, batch_id)
        .await
        .ok_or_else(|| PipelineApiError::NotFound(format!("batch {batch_id} not found")))?;

    Ok(Json(aggregate(&state, &record).await))
}

#[utoipa::path(
    post,
    path = "/retry-failed/{batch_id}",
    params(("batch_id" = Uuid, Path, description = "Batch id returned by /push-batch")),
    request_body = RetryFailedRequest,
    responses(
        (status = 200, description = "New workflow ids for retried roles", body = RetryFailedResponse),
        (status = 404, description = "Unknown batch"),
    ),
    tag = "pipeline"
)]
pub async fn retry_failed(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(req): Json<RetryFailedRequest>,
) -> Result<Json<RetryFailedResponse>, PipelineApiError> {
    let record = load_batch(&state, batch_id)
        .await
        .ok_or_else(|| PipelineApiError::NotFound(format!("batch {batch_id} not found")))?;

    let restrict = req.workflow_ids;
    let status = aggregate(&state, &record).await;

    let mut new_workflow_ids = Vec::new();
    for role in &status.roles {
        if !role.status.is_terminal() || role.status == onboard_domain::WorkflowState::Ready {
            continue;
        }
        if let Some(restrict) = &restrict {
            if !restrict.contains(&role.workflow_id) {
                continue;
            }
        }

        // Original documents aren't recoverable from the batch record
        // (§4.5); auto-resolution runs again from scratch, same as a fresh
        // `/push` with no documents attached.
        let input = build_input(
            &state,
            record.company_id.clone(),
            role.role_name.clone(),
            Vec::new(),
            None,
            None,
            OnboardingOptions::default(),
        )
        .await?;

        let workflow_id = start_workflow(&state, input).await?;
        new_workflow_ids.push(workflow_id);
    }

    Ok(Json(RetryFailedResponse {
        batch_id,
        workflow_ids: new_workflow_ids,
    }))
}
