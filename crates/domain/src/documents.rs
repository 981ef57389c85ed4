//! Document auto-resolution ranking (§4.5).
//!
//! Pure, deterministic ranking over candidates fetched from the external
//! document-listing service. The HTTP/client side that actually calls that
//! service lives in `onboard-downstream`; this module only implements the
//! ordering contract so it can be unit tested without any I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One document returned by the document-listing service's `roles` filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub document_id: String,
    pub roles: Vec<String>,
    pub content_type: String,
    pub updated_at: DateTime<Utc>,
    pub download_url: String,
}

/// Content-type priority bucket, lower sorts first (picked first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContentTypeRank {
    Pdf,
    Docx,
    Image,
    Other,
}

impl ContentTypeRank {
    fn classify(content_type: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        if ct.contains("pdf") {
            Self::Pdf
        } else if ct.contains("word") || ct.contains("docx") || ct.contains("officedocument") {
            Self::Docx
        } else if ct.starts_with("image/") {
            Self::Image
        } else {
            Self::Other
        }
    }
}

/// Rank candidates by (a) exact role-match before partial, (b) content-type
/// priority PDF > DOCX > image/* > other, (c) most recent `updated_at`, and
/// return the single best match. `None` if `candidates` is empty.
pub fn rank_documents(candidates: &[CandidateDocument], role_name: &str) -> Option<&CandidateDocument> {
    candidates.iter().max_by(|a, b| {
        let exact_a = is_exact_role_match(a, role_name);
        let exact_b = is_exact_role_match(b, role_name);
        exact_a
            .cmp(&exact_b)
            .then_with(|| {
                // Lower ContentTypeRank is higher priority, so invert for max_by.
                let rank_a = ContentTypeRank::classify(&a.content_type);
                let rank_b = ContentTypeRank::classify(&b.content_type);
                rank_b.cmp(&rank_a)
            })
            .then_with(|| a.updated_at.cmp(&b.updated_at))
    })
}

fn is_exact_role_match(doc: &CandidateDocument, role_name: &str) -> bool {
    doc.roles.len() == 1 && doc.roles[0].eq_ignore_ascii_case(role_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, roles: &[&str], content_type: &str, updated_at: &str) -> CandidateDocument {
        CandidateDocument {
            document_id: id.to_string(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            content_type: content_type.to_string(),
            updated_at: updated_at.parse().unwrap(),
            download_url: format!("https://docs/{id}"),
        }
    }

    #[test]
    fn exact_role_match_wins_over_content_type() {
        let candidates = vec![
            doc("pdf-partial", &["Claims Adjuster", "Other Role"], "application/pdf", "2026-01-01T00:00:00Z"),
            doc("image-exact", &["Claims Adjuster"], "image/png", "2026-01-01T00:00:00Z"),
        ];

        let best = rank_documents(&candidates, "Claims Adjuster").unwrap();
        assert_eq!(best.document_id, "image-exact");
    }

    #[test]
    fn content_type_breaks_ties_within_exact_match() {
        let candidates = vec![
            doc("exact-image", &["Claims Adjuster"], "image/png", "2026-01-01T00:00:00Z"),
            doc("exact-pdf", &["Claims Adjuster"], "application/pdf", "2026-01-01T00:00:00Z"),
        ];

        let best = rank_documents(&candidates, "Claims Adjuster").unwrap();
        assert_eq!(best.document_id, "exact-pdf");
    }

    #[test]
    fn most_recent_breaks_remaining_ties() {
        let candidates = vec![
            doc("older", &["Claims Adjuster"], "application/pdf", "2026-01-01T00:00:00Z"),
            doc("newer", &["Claims Adjuster"], "application/pdf", "2026-02-01T00:00:00Z"),
        ];

        let best = rank_documents(&candidates, "Claims Adjuster").unwrap();
        assert_eq!(best.document_id, "newer");
    }

    #[test]
    fn empty_candidates_returns_none() {
        assert!(rank_documents(&[], "Anything").is_none());
    }
}
