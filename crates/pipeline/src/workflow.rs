//! `RoleOnboardingWorkflow`: the two-step `RoleOnboarding` workflow (§4.4).
//!
//! Step 1 (`role_setup`) is `create_company_role` followed by
//! `link_job_description`; step 2 (`ai_assessment`) is `run_ai_assessment`.
//! Both sub-activities of step 1 must succeed for the step to complete.
//! The workflow itself never touches the network or the clock — it only
//! decides what to schedule next given the event it was just handed,
//! exactly like the `CounterWorkflow` fixture this is grounded on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use onboard_domain::{resolve_jd_payload, JdPayload, RoleOnboardingInput};
use onboard_durable::{Workflow, WorkflowAction, WorkflowError};

use crate::activities::{
    self, CreateCompanyRoleInput, LinkJobDescriptionInput, RunAiAssessmentInput,
    CREATE_COMPANY_ROLE, LINK_JOB_DESCRIPTION, RUN_AI_ASSESSMENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingCompanyRole,
    AwaitingJobDescriptionLink,
    AwaitingAiAssessment,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleOnboardingOutput {
    pub company_role_id: String,
    pub ai_automation_score: f64,
    pub jd_linked: bool,
}

pub struct RoleOnboardingWorkflow {
    input: RoleOnboardingInput,
    phase: Phase,
    company_role_id: Option<String>,
    output: Option<RoleOnboardingOutput>,
    error: Option<WorkflowError>,
}

impl RoleOnboardingWorkflow {
    fn fail(&mut self, message: impl Into<String>, code: &str) -> Vec<WorkflowAction> {
        let err = WorkflowError::new(message).with_code(code);
        self.error = Some(err.clone());
        self.phase = Phase::Done;
        vec![WorkflowAction::fail(err)]
    }

    fn schedule_link_job_description(&mut self, company_role_id: String) -> Vec<WorkflowAction> {
        let payload = match resolve_jd_payload(&self.input, None) {
            Ok(payload) => payload,
            Err(e) => return self.fail(e.to_string(), "VALIDATION_ERROR"),
        };

        let (jd_content, jd_uri) = match payload {
            JdPayload::Content(content) => (Some(content), None),
            JdPayload::Uri(uri) => (None, Some(uri)),
        };

        let jd = self.input.first_job_description();
        let activity_input = LinkJobDescriptionInput {
            company_role_id,
            jd_content,
            jd_uri,
            jd_title: jd.and_then(|d| d.name.clone()),
            metadata: jd.map(|d| d.metadata.clone()).unwrap_or_default(),
            context: self.input.context.clone(),
        };

        self.phase = Phase::AwaitingJobDescriptionLink;
        vec![WorkflowAction::ScheduleActivity {
            activity_id: LINK_JOB_DESCRIPTION.into(),
            activity_type: LINK_JOB_DESCRIPTION.into(),
            input: serde_json::to_value(&activity_input).unwrap_or(Value::Null),
            options: activities::link_job_description_options(),
        }]
    }

    fn schedule_run_ai_assessment(&mut self) -> Vec<WorkflowAction> {
        let company_role_id = self.company_role_id.clone().unwrap_or_default();
        let activity_input = RunAiAssessmentInput {
            company_id: self.input.company_id.clone(),
            role_name: self.input.role_name.clone(),
            company_role_id,
            delete_existing: self.input.options.force_rerun,
            store_in_neo4j: true,
            context: self.input.context.clone(),
        };

        self.phase = Phase::AwaitingAiAssessment;
        vec![WorkflowAction::ScheduleActivity {
            activity_id: RUN_AI_ASSESSMENT.into(),
            activity_type: RUN_AI_ASSESSMENT.into(),
            input: serde_json::to_value(&activity_input).unwrap_or(Value::Null),
            options: activities::run_ai_assessment_options(),
        }]
    }
}

impl Workflow for RoleOnboardingWorkflow {
    const TYPE: &'static str = "role_onboarding";
    type Input = RoleOnboardingInput;
    type Output = RoleOnboardingOutput;

    fn new(input: Self::Input) -> Self {
        Self {
            input,
            phase: Phase::AwaitingCompanyRole,
            company_role_id: None,
            output: None,
            error: None,
        }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        let activity_input = CreateCompanyRoleInput {
            company_id: self.input.company_id.clone(),
            role_name: self.input.role_name.clone(),
            draup_role_id: self.input.draup_role_id.clone(),
            draup_role_name: self.input.draup_role_name.clone(),
            context: self.input.context.clone(),
        };

        vec![WorkflowAction::ScheduleActivity {
            activity_id: CREATE_COMPANY_ROLE.into(),
            activity_type: CREATE_COMPANY_ROLE.into(),
            input: serde_json::to_value(&activity_input).unwrap_or(Value::Null),
            options: activities::create_company_role_options(),
        }]
    }

    fn on_activity_completed(
        &mut self,
        activity_id: &str,
        result: Value,
    ) -> Vec<WorkflowAction> {
        match activity_id {
            CREATE_COMPANY_ROLE => {
                let output: onboard_downstream::CreateCompanyRoleResponse =
                    match serde_json::from_value(result) {
                        Ok(v) => v,
                        Err(e) => {
                            return self.fail(
                                format!("malformed create_company_role result: {e}"),
                                "EXECUTION_ERROR",
                            )
                        }
                    };
                self.company_role_id = Some(output.company_role_id.clone());
                self.schedule_link_job_description(output.company_role_id)
            }
            LINK_JOB_DESCRIPTION => {
                let output: onboard_downstream::LinkJobDescriptionResponse =
                    match serde_json::from_value(result) {
                        Ok(v) => v,
                        Err(e) => {
                            return self.fail(
                                format!("malformed link_job_description result: {e}"),
                                "EXECUTION_ERROR",
                            )
                        }
                    };
                if !output.jd_linked {
                    return self.fail("job description was not linked", "EXECUTION_ERROR");
                }
                self.schedule_run_ai_assessment()
            }
            RUN_AI_ASSESSMENT => {
                let output: onboard_downstream::RunAiAssessmentResponse =
                    match serde_json::from_value(result) {
                        Ok(v) => v,
                        Err(e) => {
                            return self.fail(
                                format!("malformed run_ai_assessment result: {e}"),
                                "EXECUTION_ERROR",
                            )
                        }
                    };
                let company_role_id = self.company_role_id.clone().unwrap_or_default();
                self.output = Some(RoleOnboardingOutput {
                    company_role_id,
                    ai_automation_score: output.ai_automation_score,
                    jd_linked: true,
                });
                self.phase = Phase::Done;
                vec![WorkflowAction::complete(
                    serde_json::to_value(self.output.as_ref()).unwrap_or(Value::Null),
                )]
            }
            _ => vec![WorkflowAction::None],
        }
    }

    fn on_activity_failed(
        &mut self,
        _activity_id: &str,
        error: &onboard_durable::ActivityError,
    ) -> Vec<WorkflowAction> {
        let code = error
            .error_type
            .clone()
            .unwrap_or_else(|| "EXECUTION_ERROR".to_string());
        self.fail(error.message.clone(), &code)
    }

    fn is_completed(&self) -> bool {
        self.phase == Phase::Done
    }

    fn result(&self) -> Option<Self::Output> {
        self.output.clone()
    }

    fn error(&self) -> Option<WorkflowError> {
        self.error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_domain::{DocumentRef, DocumentType, ExecutionContext, OnboardingOptions};
    use std::collections::HashMap;

    fn input_with_jd(content: &str) -> RoleOnboardingInput {
        RoleOnboardingInput {
            company_id: "acme".into(),
            role_name: "Claims Adjuster".into(),
            documents: vec![DocumentRef {
                doc_type: DocumentType::JobDescription,
                uri: None,
                content: Some(content.into()),
                name: Some("jd.md".into()),
                metadata: HashMap::new(),
            }],
            draup_role_id: None,
            draup_role_name: None,
            options: OnboardingOptions::default(),
            context: ExecutionContext::new("acme"),
        }
    }

    #[test]
    fn on_start_schedules_create_company_role() {
        let mut wf = RoleOnboardingWorkflow::new(input_with_jd("# JD"));
        let actions = wf.on_start();
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            WorkflowAction::ScheduleActivity { activity_type, .. } => {
                assert_eq!(activity_type, CREATE_COMPANY_ROLE);
            }
            other => panic!("expected ScheduleActivity, got {other:?}"),
        }
    }

    #[test]
    fn full_happy_path_completes_with_output() {
        let mut wf = RoleOnboardingWorkflow::new(input_with_jd("# JD"));
        wf.on_start();

        let actions = wf.on_activity_completed(
            CREATE_COMPANY_ROLE,
            serde_json::json!({ "company_role_id": "cr-1" }),
        );
        assert!(matches!(
            actions[0],
            WorkflowAction::ScheduleActivity { .. }
        ));

        let actions = wf.on_activity_completed(
            LINK_JOB_DESCRIPTION,
            serde_json::json!({
                "jd_linked": true,
                "jd_content_length": 4,
                "formatted": false,
                "company_role_id": "cr-1"
            }),
        );
        assert!(matches!(
            actions[0],
            WorkflowAction::ScheduleActivity { .. }
        ));
        assert!(!wf.is_completed());

        let actions = wf.on_activity_completed(
            RUN_AI_ASSESSMENT,
            serde_json::json!({ "ai_automation_score": 0.75, "task_analysis": [] }),
        );
        assert!(matches!(actions[0], WorkflowAction::CompleteWorkflow { .. }));
        assert!(wf.is_completed());
        assert_eq!(wf.result().unwrap().company_role_id, "cr-1");
    }

    #[test]
    fn activity_failure_fails_the_workflow() {
        let mut wf = RoleOnboardingWorkflow::new(input_with_jd("# JD"));
        wf.on_start();

        let error = onboard_durable::ActivityError::non_retryable("downstream rejected request")
            .with_type("VALIDATION");
        let actions = wf.on_activity_failed(CREATE_COMPANY_ROLE, &error);

        assert!(matches!(actions[0], WorkflowAction::FailWorkflow { .. }));
        assert!(wf.is_completed());
        assert_eq!(wf.error().unwrap().code.as_deref(), Some("VALIDATION"));
    }

    #[test]
    fn missing_job_description_at_link_time_fails_with_validation_error() {
        let mut wf = RoleOnboardingWorkflow::new(RoleOnboardingInput {
            documents: vec![],
            ..input_with_jd("# JD")
        });
        wf.on_start();
        let actions = wf.on_activity_completed(
            CREATE_COMPANY_ROLE,
            serde_json::json!({ "company_role_id": "cr-1" }),
        );
        assert!(matches!(actions[0], WorkflowAction::FailWorkflow { .. }));
        assert_eq!(wf.error().unwrap().code.as_deref(), Some("VALIDATION_ERROR"));
    }
}
