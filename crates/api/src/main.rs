use anyhow::{Context, Result};
use onboard_api::config::ApiConfig;
use onboard_api::telemetry::{init_telemetry, TelemetryConfig};
use onboard_api::{build_app, AppState};
use onboard_pipeline::PipelineConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter = Some("onboard_api=debug,tower_http=debug".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());

    let _telemetry_guard = init_telemetry(telemetry_config);

    tracing::info!("onboard-api starting...");

    let pipeline_config = PipelineConfig::from_env();
    let api_config = ApiConfig::from_env();

    tracing::info!(
        engine_mode = ?pipeline_config.engine_mode,
        enable_mock_data = pipeline_config.enable_mock_data,
        "pipeline configured"
    );

    let (state, worker_pool) = AppState::from_config(&pipeline_config)
        .await
        .context("failed to build application state")?;

    if let Some(pool) = worker_pool {
        tokio::spawn(async move {
            if let Err(e) = pool.start().await {
                tracing::error!(error = %e, "worker pool exited");
            }
        });
    }

    if !api_config.prefix.is_empty() {
        tracing::info!(prefix = %api_config.prefix, "API prefix configured");
    }
    if api_config.cors_allowed_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?api_config.cors_allowed_origins, "CORS origins configured");
    }

    let app = build_app(state, &api_config);

    let listener = tokio::net::TcpListener::bind(&api_config.bind_addr)
        .await
        .context("failed to bind to address")?;
    tracing::info!(addr = %api_config.bind_addr, "HTTP server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
