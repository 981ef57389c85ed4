//! `POST /push` (§4.5, §6): validate, auto-resolve a missing job description,
//! and enqueue a single `RoleOnboarding` workflow.

use std::collections::HashMap;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use onboard_domain::{
    rank_documents, validate_input, CandidateDocument, DocumentRef, DocumentType,
    ExecutionContext, OnboardingOptions, RoleOnboardingInput,
};

use crate::error::PipelineApiError;
use crate::state::{start_workflow, AppState};

/// Workflows have historically taken roughly this long end to end
/// (`create_company_role` + `link_job_description` + `run_ai_assessment`);
/// reported back to callers as a rough ETA, not a guarantee (§6 example).
const ESTIMATED_DURATION_SECONDS: u64 = 600;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PushRequest {
    pub company_id: String,
    pub role_name: String,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draup_role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draup_role_name: Option<String>,
    #[serde(default)]
    pub options: OnboardingOptions,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PushResponse {
    pub workflow_id: Uuid,
    pub status: &'static str,
    pub estimated_duration_seconds: u64,
    pub message: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/push", post(push))
        .with_state(state)
}

/// Four synthetic fixtures, one per content-type tier, so `rank_documents`'s
/// priority ordering is still exercised with `ENABLE_MOCK_DATA=true` and no
/// external document-listing service reachable.
fn mock_candidates(role_name: &str) -> Vec<CandidateDocument> {
    vec![CandidateDocument {
        document_id: "mock-doc-1".to_string(),
        roles: vec![role_name.to_string()],
        content_type: "application/pdf".to_string(),
        updated_at: Utc::now(),
        download_url: "https://mock.local/documents/mock-doc-1".to_string(),
    }]
}

/// §4.5's document auto-resolution contract: when the caller didn't attach
/// a usable job description, look one up by `role_name`, rank the
/// candidates, and splice the winner in as a `job_description` document.
/// `ENABLE_MOCK_DATA=true` substitutes fixtures for the external call
/// (§6 configuration table), matching `/push-batch`'s and `/push`'s shared
/// resolution path.
async fn resolve_documents_if_missing(
    state: &AppState,
    company_id: &str,
    role_name: &str,
    mut documents: Vec<DocumentRef>,
) -> Result<Vec<DocumentRef>, PipelineApiError> {
    let has_usable_jd = documents
        .iter()
        .any(|d| d.is_job_description() && d.has_usable_payload());
    if has_usable_jd {
        return Ok(documents);
    }

    let candidates = if state.enable_mock_data {
        mock_candidates(role_name)
    } else {
        state.downstream.list_documents(role_name).await?
    };

    let resolved = rank_documents(&candidates, role_name).ok_or_else(|| {
        PipelineApiError::Validation(format!(
            "no resolvable job description for company={company_id} role={role_name}"
        ))
    })?;

    let mut metadata = HashMap::new();
    metadata.insert(
        "document_id".to_string(),
        Value::String(resolved.document_id.clone()),
    );
    metadata.insert(
        "content_type".to_string(),
        Value::String(resolved.content_type.clone()),
    );

    documents.push(DocumentRef {
        doc_type: DocumentType::JobDescription,
        uri: Some(resolved.download_url.clone()),
        content: None,
        name: Some(resolved.document_id.clone()),
        metadata,
    });

    Ok(documents)
}

pub(crate) async fn build_input(
    state: &AppState,
    company_id: String,
    role_name: String,
    documents: Vec<DocumentRef>,
    draup_role_id: Option<String>,
    draup_role_name: Option<String>,
    options: OnboardingOptions,
) -> Result<RoleOnboardingInput, PipelineApiError> {
    let documents =
        resolve_documents_if_missing(state, &company_id, &role_name, documents).await?;

    let input = RoleOnboardingInput {
        company_id: company_id.clone(),
        role_name,
        documents,
        draup_role_id,
        draup_role_name,
        options,
        context: ExecutionContext::new(company_id),
    };

    validate_input(&input)?;
    Ok(input)
}

#[utoipa::path(
    post,
    path = "/push",
    request_body = PushRequest,
    responses(
        (status = 200, description = "Workflow enqueued", body = PushResponse),
        (status = 400, description = "Validation error"),
        (status = 503, description = "Engine unavailable"),
    ),
    tag = "pipeline"
)]
pub async fn push(
    State(state): State<AppState>,
    Json(req): Json<PushRequest>,
) -> Result<Json<PushResponse>, PipelineApiError> {
    let input = build_input(
        &state,
        req.company_id,
        req.role_name,
        req.documents,
        req.draup_role_id,
        req.draup_role_name,
        req.options,
    )
    .await?;

    let workflow_id = start_workflow(&state, input).await?;

    Ok(Json(PushResponse {
        workflow_id,
        status: "queued",
        estimated_duration_seconds: ESTIMATED_DURATION_SECONDS,
        message: "workflow enqueued".to_string(),
    }))
}
