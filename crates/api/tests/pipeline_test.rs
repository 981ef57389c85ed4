//! End-to-end coverage of the HTTP control surface (§8), driven through the
//! assembled router with `tower::ServiceExt::oneshot`, against a stubbed
//! downstream API the same way `onboard-downstream`'s own client tests do.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use onboard_api::config::ApiConfig;
use onboard_api::{build_app, AppState};
use onboard_downstream::DownstreamConfig;
use onboard_pipeline::{EngineMode, PipelineConfig};
use onboard_status::StatusStoreConfig;

fn test_api_config() -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        prefix: String::new(),
        cors_allowed_origins: Vec::new(),
    }
}

fn inline_config(base_url: String, enable_mock_data: bool) -> PipelineConfig {
    PipelineConfig {
        environment: "test".to_string(),
        engine_mode: EngineMode::Inline,
        engine_host: "localhost".to_string(),
        engine_namespace: "onboarding".to_string(),
        engine_task_queue: "role-onboarding".to_string(),
        max_concurrent_activities: 50,
        max_concurrent_workflows: 100,
        downstream: DownstreamConfig {
            base_url,
            timeout: Duration::from_secs(5),
            auth_token: None,
        },
        status_store: StatusStoreConfig::from_env(),
        enable_mock_data,
    }
}

async fn mount_happy_path(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/create-company-role"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"company_role_id": "cr-1"})),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/link-job-description"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jd_linked": true,
            "jd_content_length": 42,
            "formatted": false,
            "company_role_id": "cr-1",
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/run-ai-assessment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ai_automation_score": 0.73,
            "task_analysis": [],
        })))
        .mount(server)
        .await;
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn push_happy_path_reaches_ready() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let config = inline_config(server.uri(), false);
    let state = AppState::inline(&config, None);
    let app = build_app(state, &test_api_config());

    let req = Request::builder()
        .method("POST")
        .uri("/push")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "company_id": "acme",
                "role_name": "Claims Adjuster",
                "documents": [
                    {"type": "job_description", "content": "Adjudicate claims."}
                ],
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let push_body = body_json(response).await;
    assert_eq!(push_body["status"], "queued");
    let workflow_id = push_body["workflow_id"].as_str().unwrap().to_string();

    let mut last_state = String::new();
    for _ in 0..50 {
        let status_req = Request::builder()
            .method("GET")
            .uri(format!("/status/{workflow_id}"))
            .body(Body::empty())
            .unwrap();
        let status_response = app.clone().oneshot(status_req).await.unwrap();
        assert_eq!(status_response.status(), StatusCode::OK);
        let status_body = body_json(status_response).await;
        last_state = status_body["state"].as_str().unwrap().to_string();
        if last_state == "ready" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(last_state, "ready");
}

#[tokio::test]
async fn push_rejects_missing_company_id() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let config = inline_config(server.uri(), false);
    let state = AppState::inline(&config, None);
    let app = build_app(state, &test_api_config());

    let req = Request::builder()
        .method("POST")
        .uri("/push")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "company_id": "",
                "role_name": "Claims Adjuster",
                "documents": [{"type": "job_description", "content": "text"}],
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"]["error"], "VALIDATION_ERROR");
    assert_eq!(body["detail"]["recoverable"], false);
}

#[tokio::test]
async fn push_auto_resolves_missing_documents_with_mock_data() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let config = inline_config(server.uri(), true);
    let state = AppState::inline(&config, None);
    let app = build_app(state, &test_api_config());

    let req = Request::builder()
        .method("POST")
        .uri("/push")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"company_id": "acme", "role_name": "Claims Adjuster"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "queued");
}

#[tokio::test]
async fn push_without_documents_and_without_mock_data_fails_resolution() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;
    Mock::given(method("GET"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents": []})))
        .mount(&server)
        .await;

    let config = inline_config(server.uri(), false);
    let state = AppState::inline(&config, None);
    let app = build_app(state, &test_api_config());

    let req = Request::builder()
        .method("POST")
        .uri("/push")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"company_id": "acme", "role_name": "Claims Adjuster"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_inline_engine_mode() {
    let server = MockServer::start().await;
    let config = inline_config(server.uri(), false);
    let state = AppState::inline(&config, None);
    let app = build_app(state, &test_api_config());

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["engine_mode"], "inline");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn companies_and_roles_are_passthrough() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"company_id": "acme", "company_name": "Acme Corp"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/roles/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"role_name": "Claims Adjuster"}
        ])))
        .mount(&server)
        .await;

    let config = inline_config(server.uri(), false);
    let state = AppState::inline(&config, None);
    let app = build_app(state, &test_api_config());

    let companies_req = Request::builder()
        .method("GET")
        .uri("/companies")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(companies_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["company_id"], "acme");

    let roles_req = Request::builder()
        .method("GET")
        .uri("/roles/acme")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(roles_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["role_name"], "Claims Adjuster");
}

#[tokio::test]
async fn push_batch_reports_partial_failures_and_retry_failed_resubmits() {
    let server = MockServer::start().await;
    mount_happy_path(&server).await;

    let config = inline_config(server.uri(), false);
    let state = AppState::inline(&config, None);
    let app = build_app(state, &test_api_config());

    let req = Request::builder()
        .method("POST")
        .uri("/push-batch")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "company_id": "acme",
                "roles": [
                    {
                        "role_name": "Claims Adjuster",
                        "documents": [{"type": "job_description", "content": "text"}],
                    },
                    {
                        "role_name": "",
                        "documents": [{"type": "job_description", "content": "text"}],
                    },
                ],
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_roles"], 2);
    assert_eq!(body["workflow_ids"].as_array().unwrap().len(), 1);
    let batch_id = body["batch_id"].as_str().unwrap().to_string();

    // Let the one accepted role reach a terminal state before aggregating.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let status_req = Request::builder()
        .method("GET")
        .uri(format!("/batch-status/{batch_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(status_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status_body = body_json(response).await;
    assert_eq!(status_body["total"], 1);

    let retry_req = Request::builder()
        .method("POST")
        .uri(format!("/retry-failed/{batch_id}"))
        .header("content-type", "application/json")
        .body(Body::from(json!({}).to_string()))
        .unwrap();
    let response = app.oneshot(retry_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn batch_status_for_unknown_batch_is_not_found() {
    let server = MockServer::start().await;
    let config = inline_config(server.uri(), false);
    let state = AppState::inline(&config, None);
    let app = build_app(state, &test_api_config());

    let req = Request::builder()
        .method("GET")
        .uri(format!("/batch-status/{}", uuid::Uuid::now_v7()))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
