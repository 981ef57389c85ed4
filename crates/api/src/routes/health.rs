//! `GET /health` (§4.5): overall status plus component reachability.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{AppState, Engine};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine_mode: &'static str,
    pub engine: ComponentHealth,
    pub status_store: ComponentHealth,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Component reachability", body = HealthResponse)),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine_mode = match &state.engine {
        Engine::Durable { .. } => "durable",
        Engine::Inline { .. } => "inline",
    };

    let engine = match &state.engine {
        Engine::Durable { executor } => match executor
            .store()
            .list_workers(onboard_durable::persistence::WorkerFilter::default())
            .await
        {
            Ok(_) => ComponentHealth { reachable: true, detail: None },
            Err(e) => ComponentHealth {
                reachable: false,
                detail: Some(e.to_string()),
            },
        },
        Engine::Inline { .. } => ComponentHealth { reachable: true, detail: None },
    };

    let status_store = match &state.status_store {
        Some(store) => match store.get_workflow_status(uuid::Uuid::nil()).await {
            Ok(_) => ComponentHealth { reachable: true, detail: None },
            Err(e) => ComponentHealth {
                reachable: false,
                detail: Some(e.to_string()),
            },
        },
        None => ComponentHealth {
            reachable: false,
            detail: Some("status store not configured".to_string()),
        },
    };

    let status = if engine.reachable { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        engine_mode,
        engine,
        status_store,
    })
}
