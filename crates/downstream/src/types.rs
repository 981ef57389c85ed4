//! Request/response shapes for the three downstream processing-API calls.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateCompanyRoleRequest {
    pub company_name: String,
    pub role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draup_role_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draup_role_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateCompanyRoleResponse {
    pub company_role_id: String,
}

/// Exactly one of `jd_content` / `jd_uri` must be set; `jd_content` wins if both are.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LinkJobDescriptionRequest {
    pub company_role_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jd_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jd_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jd_title: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
    pub format_with_llm: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LinkJobDescriptionResponse {
    pub jd_linked: bool,
    pub jd_content_length: i64,
    pub formatted: bool,
    pub company_role_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RunAiAssessmentRequest {
    pub company_name: String,
    pub role_name: String,
    pub company_role_id: String,
    pub delete_existing: bool,
    pub store_in_neo4j: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RunAiAssessmentResponse {
    pub ai_automation_score: f64,
    #[serde(default)]
    pub task_analysis: Vec<Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Response envelope for the document-listing endpoint's first page.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DocumentListingResponse {
    #[serde(default)]
    pub documents: Vec<onboard_domain::CandidateDocument>,
}

/// One entry of `GET /companies` — trivial passthrough from the taxonomy
/// endpoint, not a Role Onboarding domain type.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CompanySummary {
    pub company_id: String,
    pub company_name: String,
}

/// One entry of `GET /roles/{company}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RoleTaxonomyEntry {
    pub role_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draup_role_id: Option<String>,
}
