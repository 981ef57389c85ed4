//! `DownstreamClient` — a thin typed wrapper around the external
//! processing service, one method per call. Grounded on the same
//! `Client` + `base_url` + optional bearer token shape the codebase
//! already uses for its LLM-provider clients.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use onboard_domain::CandidateDocument;

use crate::error::DownstreamError;
use crate::types::{
    CompanySummary, CreateCompanyRoleRequest, CreateCompanyRoleResponse, DocumentListingResponse,
    LinkJobDescriptionRequest, LinkJobDescriptionResponse, RoleTaxonomyEntry,
    RunAiAssessmentRequest, RunAiAssessmentResponse,
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ASSESSMENT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Called periodically while `run_ai_assessment` awaits the downstream
/// response, so the caller (an activity) can keep its own heartbeat alive.
pub type HeartbeatFn = dyn Fn() -> BoxFuture<'static, ()> + Send + Sync;

/// Environment-driven configuration, read once at process startup.
#[derive(Debug, Clone)]
pub struct DownstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub auth_token: Option<String>,
}

impl DownstreamConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("DOWNSTREAM_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8081".to_string());
        let timeout_secs = std::env::var("DOWNSTREAM_API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let auth_token = std::env::var("DOWNSTREAM_API_AUTH_TOKEN").ok();

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            auth_token,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownstreamClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    auth_token: Option<String>,
}

impl DownstreamClient {
    pub fn new(config: DownstreamConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            auth_token: config.auth_token,
        }
    }

    pub fn from_env() -> Self {
        Self::new(DownstreamConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path)).timeout(self.timeout);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send_json<Req, Res>(&self, path: &str, body: &Req) -> Result<Res, DownstreamError>
    where
        Req: serde::Serialize + ?Sized,
        Res: serde::de::DeserializeOwned,
    {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DownstreamError::from_status(status, text));
        }

        response
            .json::<Res>()
            .await
            .map_err(|e| DownstreamError::Decode { message: e.to_string() })
    }

    async fn get_json<Res>(&self, path: &str, query: &[(&str, &str)]) -> Result<Res, DownstreamError>
    where
        Res: serde::de::DeserializeOwned,
    {
        let response = self
            .request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DownstreamError::from_status(status, text));
        }

        response
            .json::<Res>()
            .await
            .map_err(|e| DownstreamError::Decode { message: e.to_string() })
    }

    /// First page of the document-listing endpoint, filtered by `roles`
    /// (used for document auto-resolution, §4.5).
    #[instrument(skip(self))]
    pub async fn list_documents(&self, role_name: &str) -> Result<Vec<CandidateDocument>, DownstreamError> {
        debug!(role_name, "calling document-listing");
        let page: DocumentListingResponse = self
            .get_json("/documents", &[("roles", role_name)])
            .await?;
        Ok(page.documents)
    }

    /// Trivial passthrough to the companies taxonomy list.
    #[instrument(skip(self))]
    pub async fn list_companies(&self) -> Result<Vec<CompanySummary>, DownstreamError> {
        self.get_json("/companies", &[]).await
    }

    /// Trivial passthrough to a company's role taxonomy list.
    #[instrument(skip(self))]
    pub async fn list_roles(&self, company: &str) -> Result<Vec<RoleTaxonomyEntry>, DownstreamError> {
        self.get_json(&format!("/roles/{company}"), &[]).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_company_role(
        &self,
        request: CreateCompanyRoleRequest,
    ) -> Result<CreateCompanyRoleResponse, DownstreamError> {
        debug!(role_name = %request.role_name, "calling create-company-role");
        self.send_json("/create-company-role", &request).await
    }

    #[instrument(skip(self, request))]
    pub async fn link_job_description(
        &self,
        request: LinkJobDescriptionRequest,
    ) -> Result<LinkJobDescriptionResponse, DownstreamError> {
        debug!(company_role_id = %request.company_role_id, "calling link-job-description");
        self.send_json("/link-job-description", &request).await
    }

    /// Calls `/run-ai-assessment`. Since this call can run long, `heartbeat`
    /// (if given) is invoked roughly every 30s while the response is
    /// outstanding, satisfying the activity's own heartbeat obligation.
    #[instrument(skip(self, request, heartbeat))]
    pub async fn run_ai_assessment(
        &self,
        request: RunAiAssessmentRequest,
        heartbeat: Option<Arc<HeartbeatFn>>,
    ) -> Result<RunAiAssessmentResponse, DownstreamError> {
        debug!(company_role_id = %request.company_role_id, "calling run-ai-assessment");

        let call = self.send_json("/run-ai-assessment", &request);
        tokio::pin!(call);

        let mut ticker = tokio::time::interval(ASSESSMENT_HEARTBEAT_INTERVAL);
        ticker.tick().await; // first tick fires immediately; consume it

        loop {
            tokio::select! {
                result = &mut call => return result,
                _ = ticker.tick() => {
                    if let Some(hb) = &heartbeat {
                        hb().await;
                    } else {
                        warn!("run_ai_assessment heartbeat tick with no heartbeat sink configured");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CreateCompanyRoleRequest, LinkJobDescriptionRequest};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DownstreamClient {
        DownstreamClient::new(DownstreamConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            auth_token: None,
        })
    }

    #[tokio::test]
    async fn create_company_role_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-company-role"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"company_role_id": "cr-1"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let res = client
            .create_company_role(CreateCompanyRoleRequest {
                company_name: "Acme".into(),
                role_name: "Adjuster".into(),
                draup_role_id: None,
                draup_role_name: None,
            })
            .await
            .unwrap();

        assert_eq!(res.company_role_id, "cr-1");
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/create-company-role"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .create_company_role(CreateCompanyRoleRequest {
                company_name: "Acme".into(),
                role_name: "Adjuster".into(),
                draup_role_id: None,
                draup_role_name: None,
            })
            .await
            .unwrap_err();

        assert!(err.retryable());
    }

    #[tokio::test]
    async fn client_error_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/link-job-description"))
            .respond_with(ResponseTemplate::new(422).set_body_json(
                serde_json::json!({"detail": "jd missing"}),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .link_job_description(LinkJobDescriptionRequest {
                company_role_id: "cr-1".into(),
                jd_content: None,
                jd_uri: None,
                jd_title: None,
                metadata: Default::default(),
                format_with_llm: false,
            })
            .await
            .unwrap_err();

        assert!(!err.retryable());
        assert_eq!(err.status(), Some(422));
    }

    #[tokio::test]
    async fn run_ai_assessment_ticks_heartbeat_sink() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/run-ai-assessment"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "ai_automation_score": 0.42,
                    "task_analysis": []
                })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let res = client
            .run_ai_assessment(
                RunAiAssessmentRequest {
                    company_name: "Acme".into(),
                    role_name: "Adjuster".into(),
                    company_role_id: "cr-1".into(),
                    delete_existing: false,
                    store_in_neo4j: true,
                },
                None,
            )
            .await
            .unwrap();

        assert!((res.ai_automation_score - 0.42).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn list_documents_filters_by_role_query_param() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents"))
            .and(wiremock::matchers::query_param("roles", "Adjuster"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "documents": [{
                    "document_id": "doc-1",
                    "roles": ["Adjuster"],
                    "content_type": "application/pdf",
                    "updated_at": "2026-01-01T00:00:00Z",
                    "download_url": "https://docs/doc-1"
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let docs = client.list_documents("Adjuster").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].document_id, "doc-1");
    }

    #[tokio::test]
    async fn list_companies_passthrough() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"company_id": "acme", "company_name": "Acme Corp"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let companies = client.list_companies().await.unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].company_id, "acme");
    }

    #[tokio::test]
    async fn list_roles_passthrough() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/roles/acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"role_name": "Claims Adjuster"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let roles = client.list_roles("acme").await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role_name, "Claims Adjuster");
    }
}
