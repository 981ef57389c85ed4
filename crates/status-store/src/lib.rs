//! Ephemeral status cache for the Role Onboarding pipeline.
//!
//! The durable-execution engine remains the single source of truth for
//! workflow state; this crate exists only to reduce read load on the
//! engine's history service and to carry per-step timing fields the
//! engine itself doesn't track. Every operation here is best-effort: a
//! store failure is never allowed to fail a workflow or a status read.

mod error;
mod store;

pub use error::StatusStoreError;
pub use store::{
    try_get_workflow_status, try_set_workflow_status, StatusStore, StatusStoreConfig,
};
