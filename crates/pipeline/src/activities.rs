//! Typed `Activity` impls wrapping the three downstream calls (§4.3, §4.4).
//!
//! One activity per external call; retry policy and timeouts come straight
//! from the retry table and are attached to the `ActivityOptions` the
//! workflow hands the engine when it schedules each activity, not to the
//! activity impl itself (the impl never retries on its own).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use onboard_domain::ExecutionContext;
use onboard_downstream::{
    CreateCompanyRoleRequest, CreateCompanyRoleResponse, DownstreamClient, DownstreamError,
    HeartbeatFn, LinkJobDescriptionRequest, LinkJobDescriptionResponse, RunAiAssessmentRequest,
    RunAiAssessmentResponse,
};
use onboard_durable::{Activity, ActivityContext, ActivityError, ActivityOptions, RetryPolicy};

/// Activity type identifiers, shared between the `Activity` impls below and
/// the workflow that schedules them.
pub const CREATE_COMPANY_ROLE: &str = "create_company_role";
pub const LINK_JOB_DESCRIPTION: &str = "link_job_description";
pub const RUN_AI_ASSESSMENT: &str = "run_ai_assessment";

const ERROR_VALIDATION: &str = "VALIDATION";
const ERROR_AUTH: &str = "AUTH";
const ERROR_DECODE: &str = "DECODE_ERROR";
const ERROR_TRANSIENT: &str = "TRANSIENT";
const ERROR_TIMEOUT: &str = "TIMEOUT";

/// Translate a downstream call failure into the engine's `ActivityError`,
/// picking an `error_type` that lines up with each policy's
/// `non_retryable_errors` list below so the workflow-level retry decision
/// `onboard-pipeline` computes and the store's own task-queue decision agree.
fn classify_downstream_error(err: DownstreamError) -> ActivityError {
    let message = err.to_string();
    match &err {
        DownstreamError::Transient { .. } => {
            ActivityError::retryable(message).with_type(ERROR_TRANSIENT)
        }
        DownstreamError::Timeout { .. } => {
            ActivityError::retryable(message).with_type(ERROR_TIMEOUT)
        }
        DownstreamError::Decode { .. } => {
            ActivityError::non_retryable(message).with_type(ERROR_DECODE)
        }
        DownstreamError::Permanent { status, .. } => {
            let error_type = if *status == 401 || *status == 403 {
                ERROR_AUTH
            } else {
                ERROR_VALIDATION
            };
            ActivityError::non_retryable(message).with_type(error_type)
        }
    }
}

/// 5 min timeout, 3 attempts, 2s/30s backoff — shared by the two
/// `role_setup` sub-activities.
fn role_setup_retry_policy() -> RetryPolicy {
    RetryPolicy::exponential()
        .with_max_attempts(3)
        .with_initial_interval(Duration::from_secs(2))
        .with_max_interval(Duration::from_secs(30))
        .with_non_retryable_error(ERROR_VALIDATION)
        .with_non_retryable_error(ERROR_AUTH)
        .with_non_retryable_error(ERROR_DECODE)
}

pub fn create_company_role_options() -> ActivityOptions {
    ActivityOptions::default()
        .with_retry(role_setup_retry_policy())
        .with_start_to_close_timeout(Duration::from_secs(300))
}

pub fn link_job_description_options() -> ActivityOptions {
    ActivityOptions::default()
        .with_retry(role_setup_retry_policy())
        .with_start_to_close_timeout(Duration::from_secs(300))
}

/// 30 min timeout, 5 attempts, 5s/10min backoff, 60s heartbeat.
pub fn run_ai_assessment_options() -> ActivityOptions {
    ActivityOptions::default()
        .with_retry(
            RetryPolicy::exponential()
                .with_max_attempts(5)
                .with_initial_interval(Duration::from_secs(5))
                .with_max_interval(Duration::from_secs(600))
                .with_non_retryable_error(ERROR_VALIDATION)
                .with_non_retryable_error(ERROR_AUTH)
                .with_non_retryable_error(ERROR_DECODE),
        )
        .with_start_to_close_timeout(Duration::from_secs(1800))
        .with_heartbeat(Duration::from_secs(60))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompanyRoleInput {
    pub company_id: String,
    pub role_name: String,
    pub draup_role_id: Option<String>,
    pub draup_role_name: Option<String>,
    pub context: ExecutionContext,
}

pub struct CreateCompanyRoleActivity {
    client: Arc<DownstreamClient>,
}

impl CreateCompanyRoleActivity {
    pub fn new(client: Arc<DownstreamClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Activity for CreateCompanyRoleActivity {
    const TYPE: &'static str = CREATE_COMPANY_ROLE;
    type Input = CreateCompanyRoleInput;
    type Output = CreateCompanyRoleResponse;

    async fn execute(
        &self,
        _ctx: &ActivityContext,
        input: Self::Input,
    ) -> Result<Self::Output, ActivityError> {
        let request = CreateCompanyRoleRequest {
            company_name: input.company_id,
            role_name: input.role_name,
            draup_role_id: input.draup_role_id,
            draup_role_name: input.draup_role_name,
        };
        self.client
            .create_company_role(request)
            .await
            .map_err(classify_downstream_error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkJobDescriptionInput {
    pub company_role_id: String,
    pub jd_content: Option<String>,
    pub jd_uri: Option<String>,
    pub jd_title: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub context: ExecutionContext,
}

pub struct LinkJobDescriptionActivity {
    client: Arc<DownstreamClient>,
}

impl LinkJobDescriptionActivity {
    pub fn new(client: Arc<DownstreamClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Activity for LinkJobDescriptionActivity {
    const TYPE: &'static str = LINK_JOB_DESCRIPTION;
    type Input = LinkJobDescriptionInput;
    type Output = LinkJobDescriptionResponse;

    async fn execute(
        &self,
        _ctx: &ActivityContext,
        input: Self::Input,
    ) -> Result<Self::Output, ActivityError> {
        if input.company_role_id.trim().is_empty() {
            return Err(ActivityError::non_retryable(
                "link_job_description requires a company_role_id from create_company_role",
            )
            .with_type(ERROR_VALIDATION));
        }

        let request = LinkJobDescriptionRequest {
            company_role_id: input.company_role_id,
            jd_content: input.jd_content,
            jd_uri: input.jd_uri,
            jd_title: input.jd_title,
            metadata: input.metadata,
            format_with_llm: false,
        };
        self.client
            .link_job_description(request)
            .await
            .map_err(classify_downstream_error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAiAssessmentInput {
    pub company_id: String,
    pub role_name: String,
    pub company_role_id: String,
    pub delete_existing: bool,
    pub store_in_neo4j: bool,
    pub context: ExecutionContext,
}

pub struct RunAiAssessmentActivity {
    client: Arc<DownstreamClient>,
}

impl RunAiAssessmentActivity {
    pub fn new(client: Arc<DownstreamClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Activity for RunAiAssessmentActivity {
    const TYPE: &'static str = RUN_AI_ASSESSMENT;
    type Input = RunAiAssessmentInput;
    type Output = RunAiAssessmentResponse;

    async fn execute(
        &self,
        ctx: &ActivityContext,
        input: Self::Input,
    ) -> Result<Self::Output, ActivityError> {
        let hb = ctx.heartbeat_handle();
        let heartbeat: Arc<HeartbeatFn> = Arc::new(move || {
            let hb = hb.clone();
            Box::pin(async move {
                let _ = hb.send(None).await;
            })
        });

        let request = RunAiAssessmentRequest {
            company_name: input.company_id,
            role_name: input.role_name,
            company_role_id: input.company_role_id,
            delete_existing: input.delete_existing,
            store_in_neo4j: input.store_in_neo4j,
        };
        self.client
            .run_ai_assessment(request, Some(heartbeat))
            .await
            .map_err(classify_downstream_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_setup_options_match_retry_table() {
        let opts = create_company_role_options();
        assert_eq!(opts.retry_policy.max_attempts, 3);
        assert_eq!(opts.retry_policy.initial_interval, Duration::from_secs(2));
        assert_eq!(opts.retry_policy.max_interval, Duration::from_secs(30));
        assert_eq!(opts.start_to_close_timeout, Duration::from_secs(300));
        assert!(opts.heartbeat_timeout.is_none());
    }

    #[test]
    fn assessment_options_match_retry_table() {
        let opts = run_ai_assessment_options();
        assert_eq!(opts.retry_policy.max_attempts, 5);
        assert_eq!(opts.retry_policy.initial_interval, Duration::from_secs(5));
        assert_eq!(opts.retry_policy.max_interval, Duration::from_secs(600));
        assert_eq!(opts.start_to_close_timeout, Duration::from_secs(1800));
        assert_eq!(opts.heartbeat_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn classify_maps_server_error_to_retryable_transient() {
        let err = classify_downstream_error(DownstreamError::Transient {
            message: "boom".into(),
        });
        assert!(err.retryable);
        assert_eq!(err.error_type.as_deref(), Some(ERROR_TRANSIENT));
    }

    #[test]
    fn classify_maps_401_to_non_retryable_auth() {
        let err = classify_downstream_error(DownstreamError::Permanent {
            status: 401,
            message: "nope".into(),
        });
        assert!(!err.retryable);
        assert_eq!(err.error_type.as_deref(), Some(ERROR_AUTH));
    }

    #[test]
    fn classify_maps_422_to_non_retryable_validation() {
        let err = classify_downstream_error(DownstreamError::Permanent {
            status: 422,
            message: "bad".into(),
        });
        assert!(!err.retryable);
        assert_eq!(err.error_type.as_deref(), Some(ERROR_VALIDATION));
    }
}
