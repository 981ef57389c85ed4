//! Wires the three `Activity` impls onto a `WorkerPool` (§4.2, §9.3).
//!
//! Each handler decodes the claimed task's JSON input into the activity's
//! typed input, runs it through the `Activity::execute` impl, and converts
//! the result back into the pool's `ActivityResult`/`ActivityFailure` shape
//! so the store can apply `RetryPolicy.non_retryable_errors`.

use std::sync::Arc;

use onboard_downstream::DownstreamClient;
use onboard_durable::persistence::{ClaimedTask, WorkflowEventStore};
use onboard_durable::worker::{ActivityFailure, ActivityResult, WorkerPool};
use onboard_durable::{Activity, ActivityContext, ActivityError, WorkflowExecutor};

use crate::activities::{
    CreateCompanyRoleActivity, LinkJobDescriptionActivity, RunAiAssessmentActivity,
    CREATE_COMPANY_ROLE, LINK_JOB_DESCRIPTION, RUN_AI_ASSESSMENT,
};

fn decode_error(activity_type: &str, err: impl std::fmt::Display) -> ActivityFailure {
    ActivityFailure {
        message: format!("malformed {activity_type} payload: {err}"),
        error_type: Some("DECODE_ERROR".to_string()),
    }
}

fn to_activity_failure(err: ActivityError) -> ActivityFailure {
    ActivityFailure {
        message: err.message,
        error_type: err.error_type,
    }
}

async fn run_activity<A: Activity>(activity: &A, task: ClaimedTask) -> ActivityResult {
    let ctx = ActivityContext::new(
        task.workflow_id,
        task.activity_id.clone(),
        task.attempt,
        task.max_attempts,
    );
    let input: A::Input = serde_json::from_value(task.input)
        .map_err(|e| decode_error(A::TYPE, e))?;
    let output = activity
        .execute(&ctx, input)
        .await
        .map_err(to_activity_failure)?;
    serde_json::to_value(&output).map_err(|e| decode_error(A::TYPE, e))
}

/// Register handlers for `create_company_role`, `link_job_description`, and
/// `run_ai_assessment` on `pool`, all backed by the same downstream client.
pub fn register_activities(pool: &WorkerPool, client: Arc<DownstreamClient>) {
    let create_company_role = Arc::new(CreateCompanyRoleActivity::new(client.clone()));
    pool.register_handler(CREATE_COMPANY_ROLE, move |task| {
        let activity = create_company_role.clone();
        async move { run_activity(activity.as_ref(), task).await }
    });

    let link_job_description = Arc::new(LinkJobDescriptionActivity::new(client.clone()));
    pool.register_handler(LINK_JOB_DESCRIPTION, move |task| {
        let activity = link_job_description.clone();
        async move { run_activity(activity.as_ref(), task).await }
    });

    let run_ai_assessment = Arc::new(RunAiAssessmentActivity::new(client));
    pool.register_handler(RUN_AI_ASSESSMENT, move |task| {
        let activity = run_ai_assessment.clone();
        async move { run_activity(activity.as_ref(), task).await }
    });
}

/// `WorkerPool::complete_task`/`fail_task` only update the task-queue row —
/// they never touch the workflow's own event log, so nothing drives the
/// workflow forward once an activity finishes. This wraps each handler so it
/// also reports the outcome straight to `executor`, replaying the workflow
/// past the event it just produced, while still returning the same
/// `ActivityResult` so the pool's own retry/DLQ bookkeeping runs unchanged.
async fn run_activity_reconciled<A: Activity, S: WorkflowEventStore>(
    activity: &A,
    task: ClaimedTask,
    executor: &WorkflowExecutor<S>,
) -> ActivityResult {
    let workflow_id = task.workflow_id;
    let activity_id = task.activity_id.clone();
    let attempt = task.attempt;
    let retry_policy = task.options.retry_policy.clone();

    let result = run_activity(activity, task).await;

    match &result {
        Ok(output) => {
            if let Err(e) = executor
                .on_activity_completed(workflow_id, &activity_id, output.clone())
                .await
            {
                tracing::error!(
                    %workflow_id, %activity_id, error = %e,
                    "failed to advance workflow after activity completion"
                );
            }
        }
        Err(failure) => {
            let will_retry = attempt < retry_policy.max_attempts
                && retry_policy.should_retry(failure.error_type.as_deref());
            let error = ActivityError {
                message: failure.message.clone(),
                error_type: failure.error_type.clone(),
            };
            if let Err(e) = executor
                .on_activity_failed(workflow_id, &activity_id, error, will_retry)
                .await
            {
                tracing::error!(
                    %workflow_id, %activity_id, error = %e,
                    "failed to advance workflow after activity failure"
                );
            }
        }
    }

    result
}

/// Same registration as [`register_activities`], but every handler also
/// reconciles its outcome with `executor` (§9 architecture note: the worker
/// pool executes activities, the executor owns workflow progression).
pub fn register_activities_with_executor<S: WorkflowEventStore + 'static>(
    pool: &WorkerPool,
    client: Arc<DownstreamClient>,
    executor: Arc<WorkflowExecutor<S>>,
) {
    let create_company_role = Arc::new(CreateCompanyRoleActivity::new(client.clone()));
    let exec = executor.clone();
    pool.register_handler(CREATE_COMPANY_ROLE, move |task| {
        let activity = create_company_role.clone();
        let exec = exec.clone();
        async move { run_activity_reconciled(activity.as_ref(), task, exec.as_ref()).await }
    });

    let link_job_description = Arc::new(LinkJobDescriptionActivity::new(client.clone()));
    let exec = executor.clone();
    pool.register_handler(LINK_JOB_DESCRIPTION, move |task| {
        let activity = link_job_description.clone();
        let exec = exec.clone();
        async move { run_activity_reconciled(activity.as_ref(), task, exec.as_ref()).await }
    });

    let run_ai_assessment = Arc::new(RunAiAssessmentActivity::new(client));
    pool.register_handler(RUN_AI_ASSESSMENT, move |task| {
        let activity = run_ai_assessment.clone();
        let exec = executor.clone();
        async move { run_activity_reconciled(activity.as_ref(), task, exec.as_ref()).await }
    });
}
