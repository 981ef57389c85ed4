//! Pre-execution validation and JD-payload resolution (§3, §4.4).
//!
//! Both functions run synchronously before any activity is scheduled and
//! must not perform I/O — the auto-resolution HTTP call, if needed, happens
//! one layer up in `onboard-api` before the workflow is even started.

use crate::error::DomainError;
use crate::input::RoleOnboardingInput;

/// Validate an input against the invariants in §3:
/// - `company_id` non-empty
/// - `role_name` non-empty
/// - at least one document with type `job_description` and a usable payload
pub fn validate_input(input: &RoleOnboardingInput) -> Result<(), DomainError> {
    if input.company_id.trim().is_empty() {
        return Err(DomainError::EmptyCompanyId);
    }
    if input.role_name.trim().is_empty() {
        return Err(DomainError::EmptyRoleName);
    }
    if input.first_job_description().is_none() {
        return Err(DomainError::NoResolvableJobDescription);
    }
    Ok(())
}

/// The JD payload to hand to `link_job_description`, resolved according to
/// the priority order in §4.4: inline content, then a URI, then a taxonomy
/// summary, then abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JdPayload {
    Content(String),
    Uri(String),
}

/// Resolve the job-description payload for step 1's second sub-activity.
///
/// `taxonomy_summary` is an optional `general_summary` field from a
/// taxonomy entry attached to the input (priority 3, §4.4); callers that
/// don't have one pass `None`.
pub fn resolve_jd_payload(
    input: &RoleOnboardingInput,
    taxonomy_summary: Option<&str>,
) -> Result<JdPayload, DomainError> {
    for doc in input.documents.iter().filter(|d| d.is_job_description()) {
        if let Some(content) = doc.content.as_deref() {
            if !content.trim().is_empty() {
                return Ok(JdPayload::Content(content.to_string()));
            }
        }
    }
    for doc in input.documents.iter().filter(|d| d.is_job_description()) {
        if let Some(uri) = doc.uri.as_deref() {
            if !uri.trim().is_empty() {
                return Ok(JdPayload::Uri(uri.to_string()));
            }
        }
    }
    if let Some(summary) = taxonomy_summary {
        if !summary.trim().is_empty() {
            return Ok(JdPayload::Content(summary.to_string()));
        }
    }
    Err(DomainError::NoResolvableJobDescription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DocumentRef, DocumentType, ExecutionContext, OnboardingOptions};
    use std::collections::HashMap;

    fn base_input(documents: Vec<DocumentRef>) -> RoleOnboardingInput {
        RoleOnboardingInput {
            company_id: "LibertyMutual".into(),
            role_name: "Claims Adjuster".into(),
            documents,
            draup_role_id: None,
            draup_role_name: None,
            options: OnboardingOptions::default(),
            context: ExecutionContext::new("LibertyMutual"),
        }
    }

    fn jd_content(content: &str) -> DocumentRef {
        DocumentRef {
            doc_type: DocumentType::JobDescription,
            uri: None,
            content: Some(content.to_string()),
            name: None,
            metadata: HashMap::new(),
        }
    }

    fn jd_uri(uri: &str) -> DocumentRef {
        DocumentRef {
            doc_type: DocumentType::JobDescription,
            uri: Some(uri.to_string()),
            content: None,
            name: None,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn rejects_empty_company_id() {
        let mut input = base_input(vec![jd_content("# JD")]);
        input.company_id = "  ".into();
        assert_eq!(validate_input(&input), Err(DomainError::EmptyCompanyId));
    }

    #[test]
    fn rejects_empty_role_name() {
        let mut input = base_input(vec![jd_content("# JD")]);
        input.role_name = "".into();
        assert_eq!(validate_input(&input), Err(DomainError::EmptyRoleName));
    }

    #[test]
    fn rejects_missing_job_description() {
        let input = base_input(vec![]);
        assert_eq!(
            validate_input(&input),
            Err(DomainError::NoResolvableJobDescription)
        );
    }

    #[test]
    fn accepts_valid_input() {
        let input = base_input(vec![jd_content("# Claims Adjuster")]);
        assert!(validate_input(&input).is_ok());
    }

    #[test]
    fn content_wins_over_uri_when_both_present() {
        let mut doc = jd_content("inline jd text");
        doc.uri = Some("https://example.com/jd.pdf".into());
        let input = base_input(vec![doc]);

        assert_eq!(
            resolve_jd_payload(&input, None),
            Ok(JdPayload::Content("inline jd text".into()))
        );
    }

    #[test]
    fn falls_back_to_uri_when_no_content() {
        let input = base_input(vec![jd_uri("https://example.com/jd.pdf")]);
        assert_eq!(
            resolve_jd_payload(&input, None),
            Ok(JdPayload::Uri("https://example.com/jd.pdf".into()))
        );
    }

    #[test]
    fn falls_back_to_taxonomy_summary() {
        let input = base_input(vec![]);
        assert_eq!(
            resolve_jd_payload(&input, Some("General summary text")),
            Ok(JdPayload::Content("General summary text".into()))
        );
    }

    #[test]
    fn aborts_with_validation_error_when_nothing_resolves() {
        let input = base_input(vec![]);
        assert_eq!(
            resolve_jd_payload(&input, None),
            Err(DomainError::NoResolvableJobDescription)
        );
    }
}
