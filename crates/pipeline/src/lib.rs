//! Activities, workflow, and dual execution mode for the `RoleOnboarding`
//! pipeline (SPEC_FULL.md §4).
//!
//! This crate bridges the domain-agnostic `onboard-durable` engine to the
//! three downstream calls in `onboard-downstream`: typed `Activity` impls,
//! the `RoleOnboardingWorkflow` state machine, the engine-state to
//! domain-state mapping, environment-driven configuration, and the
//! `InlineRunner` used when `ENGINE_MODE=inline`.

pub mod activities;
pub mod config;
pub mod inline;
pub mod status;
pub mod worker;
pub mod workflow;

pub use activities::{
    CreateCompanyRoleActivity, CreateCompanyRoleInput, LinkJobDescriptionActivity,
    LinkJobDescriptionInput, RunAiAssessmentActivity, RunAiAssessmentInput, CREATE_COMPANY_ROLE,
    LINK_JOB_DESCRIPTION, RUN_AI_ASSESSMENT,
};
pub use config::{EngineMode, PipelineConfig};
pub use inline::{InlineRunner, StatusSink};
pub use status::{domain_state, from_engine_info};
pub use worker::{register_activities, register_activities_with_executor};
pub use workflow::{RoleOnboardingOutput, RoleOnboardingWorkflow};
