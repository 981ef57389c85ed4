//! HTTP Control Surface for the Role Onboarding pipeline (§4.5).
//!
//! Translates push/status/batch operations into orchestration commands
//! against whichever execution backend `ENGINE_MODE` selects, built from
//! per-module `AppState` + `routes()` pairs merged into one router here
//! since the surface is small.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::push::push,
        routes::status::status,
        routes::batch::push_batch,
        routes::batch::batch_status,
        routes::batch::retry_failed,
        routes::health::health,
        routes::companies::companies,
        routes::companies::roles,
    ),
    components(schemas(
        routes::push::PushRequest,
        routes::push::PushResponse,
        routes::batch::BatchRoleRequest,
        routes::batch::PushBatchRequest,
        routes::batch::PushBatchResponse,
        routes::batch::RetryFailedRequest,
        routes::batch::RetryFailedResponse,
        routes::health::ComponentHealth,
        routes::health::HealthResponse,
        onboard_domain::WorkflowStatusRecord,
        onboard_domain::Progress,
        onboard_domain::StepProgress,
        onboard_domain::StepStatus,
        onboard_domain::WorkflowState,
        onboard_domain::ErrorInfo,
        onboard_domain::BatchStatus,
        onboard_domain::RoleSummary,
        onboard_domain::BatchState,
        onboard_domain::DocumentRef,
        onboard_domain::DocumentType,
        onboard_domain::OnboardingOptions,
        onboard_downstream::CompanySummary,
        onboard_downstream::RoleTaxonomyEntry,
    )),
    tags(
        (name = "pipeline", description = "Push, status, and batch operations"),
        (name = "taxonomy", description = "Read-only company/role taxonomy passthroughs"),
        (name = "health", description = "Health and reachability"),
    ),
    info(
        title = "Role Onboarding Pipeline API",
        version = "0.1.0",
        description = "HTTP control surface for the Self-Service Role Onboarding Pipeline",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

/// Build the full router: every route module merged, an API-prefix applied
/// if configured, Swagger UI mounted, CORS applied only if origins are
/// configured, and a trace layer over everything.
pub fn build_app(state: AppState, api_config: &config::ApiConfig) -> Router {
    let api_routes = Router::new()
        .merge(routes::push::routes(state.clone()))
        .merge(routes::status::routes(state.clone()))
        .merge(routes::batch::routes(state.clone()))
        .merge(routes::companies::routes(state.clone()))
        .merge(routes::health::routes(state));

    let mut app = with_prefix(api_routes, &api_config.prefix);
    app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    if !api_config.cors_allowed_origins.is_empty() {
        let origins: Vec<HeaderValue> = api_config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
                .allow_credentials(true),
        );
    }

    app.layer(TraceLayer::new_for_http())
}

fn with_prefix<S: Clone + Send + Sync + 'static>(routes: Router<S>, prefix: &str) -> Router<S> {
    if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    }
}
