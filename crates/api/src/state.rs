//! Shared application state (§9): the durable engine handle (or the inline
//! runner), the Status Store, the downstream client, and an in-memory batch
//! registry.
//!
//! A single state struct is shared across every route module here since
//! the routes are few and all need the same handful of collaborators.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use onboard_domain::{BatchRecord, WorkflowStatusRecord};
use onboard_downstream::DownstreamClient;
use onboard_durable::persistence::InMemoryWorkflowEventStore;
use onboard_durable::{PostgresWorkflowEventStore, WorkflowEventStore, WorkflowExecutor};
use onboard_pipeline::{EngineMode, InlineRunner, PipelineConfig, RoleOnboardingWorkflow};
use onboard_status::StatusStore;

use crate::error::PipelineApiError;

/// Execution backend selected by `ENGINE_MODE` (§9.3 design note: the choice
/// lives one layer above the workflow, never inside it).
pub enum Engine {
    Durable {
        executor: Arc<WorkflowExecutor<Arc<dyn WorkflowEventStore>>>,
    },
    Inline {
        runner: Arc<InlineRunner>,
        /// `InlineRunner` has no event log of its own; every status update
        /// it reports through its `StatusSink` lands here so `/status` has
        /// something to read back for workflows run this way.
        records: Arc<DashMap<Uuid, WorkflowStatusRecord>>,
    },
}

pub struct AppStateInner {
    pub engine: Engine,
    pub downstream: Arc<DownstreamClient>,
    pub status_store: Option<Arc<StatusStore>>,
    pub batches: Arc<DashMap<Uuid, BatchRecord>>,
    pub enable_mock_data: bool,
}

#[derive(Clone)]
pub struct AppState(pub Arc<AppStateInner>);

impl AppState {
    /// Build the durable-engine-backed state: an `InMemoryWorkflowEventStore`
    /// or `PostgresWorkflowEventStore` behind `Arc<dyn WorkflowEventStore>`,
    /// wrapped in `WorkflowExecutor`, registered with `RoleOnboardingWorkflow`,
    /// and a `WorkerPool` reconciled against the same executor (§9 architecture
    /// note, resolved via `onboard_pipeline::register_activities_with_executor`).
    pub async fn durable(
        config: &PipelineConfig,
        status_store: Option<Arc<StatusStore>>,
    ) -> anyhow::Result<(Self, onboard_durable::WorkerPool)> {
        let store: Arc<dyn WorkflowEventStore> = if let Ok(database_url) =
            std::env::var("DATABASE_URL")
        {
            let pool = sqlx::PgPool::connect(&database_url).await?;
            Arc::new(PostgresWorkflowEventStore::new(pool))
        } else {
            tracing::warn!("DATABASE_URL not set, using in-memory workflow event store");
            Arc::new(InMemoryWorkflowEventStore::new())
        };

        let mut executor = WorkflowExecutor::new(store.clone());
        executor.register::<RoleOnboardingWorkflow>();
        let executor = Arc::new(executor);

        let pool = onboard_durable::WorkerPool::new(store.clone(), config.worker_pool_config());
        let downstream = Arc::new(DownstreamClient::new(config.downstream.clone()));
        onboard_pipeline::register_activities_with_executor(
            &pool,
            downstream.clone(),
            executor.clone(),
        );

        let inner = AppStateInner {
            engine: Engine::Durable {
                executor: executor.clone(),
            },
            downstream,
            status_store,
            batches: Arc::new(DashMap::new()),
            enable_mock_data: config.enable_mock_data,
        };

        Ok((Self(Arc::new(inner)), pool))
    }

    pub fn inline(config: &PipelineConfig, status_store: Option<Arc<StatusStore>>) -> Self {
        let downstream = Arc::new(DownstreamClient::new(config.downstream.clone()));
        let runner = Arc::new(InlineRunner::new(downstream.clone()));

        let inner = AppStateInner {
            engine: Engine::Inline {
                runner,
                records: Arc::new(DashMap::new()),
            },
            downstream,
            status_store,
            batches: Arc::new(DashMap::new()),
            enable_mock_data: config.enable_mock_data,
        };

        Self(Arc::new(inner))
    }

    pub async fn from_config(config: &PipelineConfig) -> anyhow::Result<(Self, Option<onboard_durable::WorkerPool>)> {
        let status_store = match StatusStore::connect(config.status_store.clone()).await {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                tracing::warn!(error = %e, "status store unavailable at startup, continuing without it");
                None
            }
        };

        match config.engine_mode {
            EngineMode::Durable => {
                let (state, pool) = Self::durable(config, status_store).await?;
                Ok((state, Some(pool)))
            }
            EngineMode::Inline => Ok((Self::inline(config, status_store), None)),
        }
    }
}

impl std::ops::Deref for AppState {
    type Target = AppStateInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Start a `RoleOnboarding` workflow through whichever engine is active,
/// returning its id immediately. Durable mode enqueues and returns; inline
/// mode spawns the synchronous run on a background task so the HTTP
/// response isn't held open for the whole pipeline.
pub async fn start_workflow(
    state: &AppState,
    input: onboard_domain::RoleOnboardingInput,
) -> Result<Uuid, PipelineApiError> {
    match &state.engine {
        Engine::Durable { executor } => {
            let id = executor
                .start_workflow::<RoleOnboardingWorkflow>(input, None)
                .await?;
            Ok(id)
        }
        Engine::Inline { runner, records } => {
            let workflow_id = Uuid::now_v7();
            records.insert(
                workflow_id,
                WorkflowStatusRecord::queued(workflow_id, Utc::now()),
            );
            let runner = runner.clone();
            let records = records.clone();
            tokio::spawn(async move {
                let sink: onboard_pipeline::StatusSink = {
                    let records = records.clone();
                    Arc::new(move |record| {
                        let records = records.clone();
                        Box::pin(async move {
                            records.insert(record.workflow_id, record);
                        })
                    })
                };
                runner.run(workflow_id, input, sink).await;
            });
            Ok(workflow_id)
        }
    }
}

/// Fetch the current status record for a workflow, preferring the Status
/// Store cache and falling back to the engine's own authoritative state
/// (§9.3: the engine is the source of truth, the cache only speeds up reads).
pub async fn get_status(
    state: &AppState,
    workflow_id: Uuid,
) -> Result<WorkflowStatusRecord, PipelineApiError> {
    if let Some(store) = &state.status_store {
        if let Some(record) = onboard_status::try_get_workflow_status(store, workflow_id).await {
            return Ok(record);
        }
    }

    match &state.engine {
        Engine::Durable { executor } => {
            let info = executor.store().get_workflow_info(workflow_id).await?;
            Ok(onboard_pipeline::from_engine_info(&info, Utc::now()))
        }
        Engine::Inline { records, .. } => records
            .get(&workflow_id)
            .map(|r| r.clone())
            .ok_or_else(|| PipelineApiError::NotFound(format!("workflow {workflow_id} not found"))),
    }
}
