//! Downstream API Client for the Role Onboarding pipeline.
//!
//! Issues the three HTTP calls the processing service exposes
//! (`create_company_role`, `link_job_description`, `run_ai_assessment`) on
//! behalf of activities, plus the read-only lookups the HTTP control
//! surface needs (document-listing for auto-resolution, and the
//! companies/roles taxonomy passthroughs). This crate never retries on its
//! own — that is the orchestration engine's job — it only applies
//! per-request timeouts and classifies failures as transient or permanent.

mod client;
mod error;
mod types;

pub use client::{DownstreamClient, DownstreamConfig, HeartbeatFn};
pub use error::DownstreamError;
pub use types::{
    CompanySummary, CreateCompanyRoleRequest, CreateCompanyRoleResponse, DocumentListingResponse,
    LinkJobDescriptionRequest, LinkJobDescriptionResponse, RoleTaxonomyEntry,
    RunAiAssessmentRequest, RunAiAssessmentResponse,
};
