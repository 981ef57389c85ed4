//! `GET /status/{workflow_id}` (§4.5, §6): authoritative engine state,
//! enriched by the Status Store cache when available.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use onboard_domain::WorkflowStatusRecord;

use crate::error::PipelineApiError;
use crate::state::{get_status, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/status/:workflow_id", get(status))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/status/{workflow_id}",
    params(("workflow_id" = Uuid, Path, description = "Workflow id returned by /push")),
    responses(
        (status = 200, description = "Workflow status", body = WorkflowStatusRecord),
        (status = 404, description = "Unknown to both engine and Status Store"),
    ),
    tag = "pipeline"
)]
pub async fn status(
    State(state): State<AppState>,
    Path(workflow_id): Path<Uuid>,
) -> Result<Json<WorkflowStatusRecord>, PipelineApiError> {
    let record = get_status(&state, workflow_id).await?;
    Ok(Json(record))
}
