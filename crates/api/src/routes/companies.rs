//! `GET /companies`, `GET /roles/{company}` (§4.5, §1): trivial read-through
//! passthroughs to the downstream taxonomy endpoints.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use onboard_downstream::{CompanySummary, RoleTaxonomyEntry};

use crate::error::PipelineApiError;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/companies", get(companies))
        .route("/roles/:company", get(roles))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/companies",
    responses((status = 200, description = "Companies taxonomy", body = [CompanySummary])),
    tag = "taxonomy"
)]
pub async fn companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanySummary>>, PipelineApiError> {
    Ok(Json(state.downstream.list_companies().await?))
}

#[utoipa::path(
    get,
    path = "/roles/{company}",
    params(("company" = String, Path, description = "Company identifier")),
    responses((status = 200, description = "Role taxonomy for a company", body = [RoleTaxonomyEntry])),
    tag = "taxonomy"
)]
pub async fn roles(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> Result<Json<Vec<RoleTaxonomyEntry>>, PipelineApiError> {
    Ok(Json(state.downstream.list_roles(&company).await?))
}
