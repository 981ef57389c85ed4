//! `PipelineConfig`: environment-driven wiring for the engine, the
//! downstream client, and the Status Store (SPEC_FULL.md §9.3).

use std::time::Duration;

use onboard_downstream::DownstreamConfig;
use onboard_durable::worker::{BackpressureConfig, PollerConfig, WorkerPoolConfig};
use onboard_status::StatusStoreConfig;

/// Which execution mode the process runs in. Selected by environment, never
/// by branching inside the workflow definition itself (§9 design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// Durable engine: event-sourced, retried, persisted task queue.
    Durable,
    /// Direct in-process invocation for local development: no retry, no
    /// persistence, fails the push on the first activity error.
    Inline,
}

impl EngineMode {
    fn from_env_str(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "inline" => Self::Inline,
            _ => Self::Durable,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub environment: String,
    pub engine_mode: EngineMode,
    pub engine_host: String,
    pub engine_namespace: String,
    pub engine_task_queue: String,
    pub max_concurrent_activities: usize,
    pub max_concurrent_workflows: usize,
    pub downstream: DownstreamConfig,
    pub status_store: StatusStoreConfig,
    pub enable_mock_data: bool,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let engine_mode = std::env::var("ENGINE_MODE")
            .map(|v| EngineMode::from_env_str(&v))
            .unwrap_or(EngineMode::Durable);
        let engine_host =
            std::env::var("ENGINE_HOST").unwrap_or_else(|_| "localhost".to_string());
        let engine_namespace =
            std::env::var("ENGINE_NAMESPACE").unwrap_or_else(|_| "onboarding".to_string());
        let engine_task_queue = std::env::var("ENGINE_TASK_QUEUE")
            .unwrap_or_else(|_| "role-onboarding".to_string());
        let max_concurrent_activities = std::env::var("ENGINE_MAX_CONCURRENT_ACTIVITIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);
        let max_concurrent_workflows = std::env::var("ENGINE_MAX_CONCURRENT_WORKFLOWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);
        let enable_mock_data = std::env::var("ENABLE_MOCK_DATA")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            environment,
            engine_mode,
            engine_host,
            engine_namespace,
            engine_task_queue,
            max_concurrent_activities,
            max_concurrent_workflows,
            downstream: DownstreamConfig::from_env(),
            status_store: StatusStoreConfig::from_env(),
            enable_mock_data,
        }
    }

    /// Worker pool configuration derived from the engine concurrency knobs.
    pub fn worker_pool_config(&self) -> WorkerPoolConfig {
        WorkerPoolConfig::new(vec![
            crate::activities::CREATE_COMPANY_ROLE.to_string(),
            crate::activities::LINK_JOB_DESCRIPTION.to_string(),
            crate::activities::RUN_AI_ASSESSMENT.to_string(),
        ])
        .with_max_concurrency(self.max_concurrent_activities)
        .with_worker_group(self.engine_task_queue.clone())
        .with_poller(PollerConfig::default())
        .with_backpressure(BackpressureConfig::default())
        .with_heartbeat_interval(Duration::from_secs(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_mode_defaults_to_durable() {
        assert_eq!(EngineMode::from_env_str("bogus"), EngineMode::Durable);
        assert_eq!(EngineMode::from_env_str("DURABLE"), EngineMode::Durable);
    }

    #[test]
    fn engine_mode_parses_inline_case_insensitively() {
        assert_eq!(EngineMode::from_env_str("Inline"), EngineMode::Inline);
        assert_eq!(EngineMode::from_env_str("inline"), EngineMode::Inline);
    }

    #[test]
    fn worker_pool_concurrency_defaults_match_spec() {
        // ENGINE_MAX_CONCURRENT_ACTIVITIES / ENGINE_MAX_CONCURRENT_WORKFLOWS
        // unset: 50 / 100 per §5's stated defaults.
        let config = PipelineConfig {
            environment: "test".into(),
            engine_mode: EngineMode::Durable,
            engine_host: "localhost".into(),
            engine_namespace: "onboarding".into(),
            engine_task_queue: "role-onboarding".into(),
            max_concurrent_activities: 50,
            max_concurrent_workflows: 100,
            downstream: DownstreamConfig::from_env(),
            status_store: StatusStoreConfig::from_env(),
            enable_mock_data: false,
        };
        assert_eq!(config.worker_pool_config().max_concurrency, 50);
    }
}
