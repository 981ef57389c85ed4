//! Domain model for the Self-Service Role Onboarding Pipeline.
//!
//! Everything in this crate is a plain value type, a pure function, or a
//! `thiserror` error enum — no I/O, no clocks, no randomness. That makes it
//! safe to call directly from inside workflow code, which must stay
//! deterministic between activity suspension points.

pub mod batch;
pub mod documents;
pub mod error;
pub mod input;
pub mod status;
pub mod step;
pub mod validation;

pub use batch::{BatchRecord, BatchState, BatchStatus, RoleSummary};
pub use documents::{rank_documents, CandidateDocument, ContentTypeRank};
pub use error::DomainError;
pub use input::{DocumentRef, DocumentType, ExecutionContext, OnboardingOptions, RoleOnboardingInput};
pub use status::{ErrorInfo, Progress, StepProgress, StepStatus, WorkflowState, WorkflowStatusRecord};
pub use step::StepResult;
pub use validation::{resolve_jd_payload, validate_input, JdPayload};
