//! `RoleOnboardingInput` and the document references it carries.
//!
//! Immutable once a push is accepted: the caller owns this value until
//! `/push` returns, after which the workflow owns its own copy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Kind of document a caller can attach to a role onboarding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    JobDescription,
    ProcessMap,
    Sop,
    Other,
}

/// A single document attached to a role, either inline or by reference.
///
/// Exactly one of `uri` / `content` is expected to carry the payload; when
/// both are present `content` wins (see [`crate::validation::resolve_jd_payload`]).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentRef {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl DocumentRef {
    pub fn is_job_description(&self) -> bool {
        self.doc_type == DocumentType::JobDescription
    }

    /// Whether this document has a payload an activity could actually use.
    pub fn has_usable_payload(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
            || self.uri.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// Per-run options, all defaulted so a minimal push request is valid.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct OnboardingOptions {
    pub skip_enhancement_workflows: bool,
    pub force_rerun: bool,
    pub notify_on_complete: bool,
}

impl Default for OnboardingOptions {
    fn default() -> Self {
        Self {
            skip_enhancement_workflows: false,
            force_rerun: false,
            notify_on_complete: true,
        }
    }
}

/// Correlation context propagated to every activity invocation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExecutionContext {
    pub company_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ExecutionContext {
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            user_id: None,
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Immutable per-run input to the `RoleOnboarding` workflow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleOnboardingInput {
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

    pub context: ExecutionContext,
}

impl RoleOnboardingInput {
    /// First document whose type is `job_description` and that carries a
    /// usable payload (priority order preserved, per §9 determinism rules).
    pub fn first_job_description(&self) -> Option<&DocumentRef> {
        self.documents
            .iter()
            .find(|d| d.is_job_description() && d.has_usable_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_matches_spec() {
        let opts = OnboardingOptions::default();
        assert!(!opts.skip_enhancement_workflows);
        assert!(!opts.force_rerun);
        assert!(opts.notify_on_complete);
    }

    #[test]
    fn first_job_description_skips_empty_payloads() {
        let input = RoleOnboardingInput {
            company_id: "acme".into(),
            role_name: "Adjuster".into(),
            documents: vec![
                DocumentRef {
                    doc_type: DocumentType::JobDescription,
                    uri: None,
                    content: Some("   ".into()),
                    name: None,
                    metadata: HashMap::new(),
                },
                DocumentRef {
                    doc_type: DocumentType::JobDescription,
                    uri: Some("https://x/jd.pdf".into()),
                    content: None,
                    name: None,
                    metadata: HashMap::new(),
                },
            ],
            draup_role_id: None,
            draup_role_name: None,
            options: OnboardingOptions::default(),
            context: ExecutionContext::new("acme"),
        };

        let jd = input.first_job_description().expect("should find a usable jd");
        assert_eq!(jd.uri.as_deref(), Some("https://x/jd.pdf"));
    }
}
