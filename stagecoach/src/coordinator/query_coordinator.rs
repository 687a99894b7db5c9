// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query Coordinator - Central orchestration for query execution
//!
//! The coordinator wires the registries together at startup, creates one
//! execution per submitted statement, dispatches it on a bounded pool and
//! runs the background services (retention sweep, cluster memory manager).

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::query_id::{QueryId, QueryIdGenerator};
use super::query_registry::QueryRegistry;
use super::query_type::classify;
use crate::ast::{Expression, Statement};
use crate::catalog::{AccessControl, Metadata};
use crate::config::{ConfigError, CoordinatorConfig};
use crate::exec::{
    DataDefinitionExecutionFactory, DataDefinitionTaskRegistry, ExecutionError, QueryExecution,
    QueryExecutionFactoryRegistry, QueryInfo, QueryPlanner, QueryRequest, SqlQueryExecutionFactory,
    StageLauncher,
};
use crate::memory::{create_low_memory_killer, ClusterMemoryManager, NodeMemoryClient, NodeRegistry};
use crate::scheduler::{ExecutionPolicyRegistry, StageId};
use crate::session::Session;
use crate::txn::TransactionManager;

/// External collaborators of the coordinator
#[derive(Clone)]
pub struct CoordinatorServices {
    pub metadata: Arc<dyn Metadata>,
    pub access_control: Arc<dyn AccessControl>,
    pub transaction_manager: Arc<dyn TransactionManager>,
    pub planner: Arc<dyn QueryPlanner>,
    pub launcher: Arc<dyn StageLauncher>,
    pub node_registry: Arc<dyn NodeRegistry>,
    pub memory_client: Arc<dyn NodeMemoryClient>,
}

/// Query Coordinator - Orchestrates query execution
///
/// This is the main entry point of the engine. It handles:
/// - Startup validation of every dispatch table
/// - Query submission and dispatch
/// - Listing, cancellation and retention of queries
/// - The cluster memory manager
pub struct QueryCoordinator {
    config: CoordinatorConfig,
    id_generator: QueryIdGenerator,
    tasks: Arc<DataDefinitionTaskRegistry>,
    factories: QueryExecutionFactoryRegistry,
    queries: Arc<QueryRegistry>,
    memory_manager: Arc<ClusterMemoryManager>,
    dispatch_permits: Arc<Semaphore>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl QueryCoordinator {
    /// Create a coordinator with the default tasks and policies
    ///
    /// Fails when the configuration is invalid or when the statement
    /// classification, the factory bindings and the task registry disagree.
    pub fn new(config: CoordinatorConfig, services: CoordinatorServices) -> Result<Self, ConfigError> {
        Self::with_tasks(
            config,
            services,
            DataDefinitionTaskRegistry::with_default_tasks(),
        )
    }

    /// Create a coordinator with a custom task registry
    pub fn with_tasks(
        config: CoordinatorConfig,
        services: CoordinatorServices,
        tasks: DataDefinitionTaskRegistry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let policies = Arc::new(ExecutionPolicyRegistry::with_default_policies());
        if policies.get(&config.execution_policy).is_none() {
            return Err(ConfigError::UnknownExecutionPolicy(
                config.execution_policy.clone(),
            ));
        }

        let tasks = Arc::new(tasks);
        let data_definition = Arc::new(DataDefinitionExecutionFactory::new(
            services.metadata.clone(),
            services.access_control.clone(),
            services.transaction_manager.clone(),
            tasks.clone(),
        ));
        let sql = Arc::new(SqlQueryExecutionFactory::new(
            services.planner.clone(),
            services.launcher.clone(),
            policies,
            config.execution_policy.clone(),
            config.memory.query_max_memory,
        ));
        let factories = QueryExecutionFactoryRegistry::bind(data_definition, sql);
        factories.verify(&tasks)?;

        let queries = Arc::new(QueryRegistry::new());
        let memory_manager = Arc::new(ClusterMemoryManager::new(
            config.memory.clone(),
            services.node_registry.clone(),
            services.memory_client.clone(),
            queries.clone(),
            create_low_memory_killer(config.memory.low_memory_killer_policy),
        ));

        log::info!(
            "Coordinator ready: {} data definition tasks, default execution policy {}, low memory killer {}",
            tasks.len(),
            config.execution_policy,
            config.memory.low_memory_killer_policy
        );

        Ok(Self {
            dispatch_permits: Arc::new(Semaphore::new(config.max_concurrent_dispatch)),
            id_generator: QueryIdGenerator::new(),
            config,
            tasks,
            factories,
            queries,
            memory_manager,
            background: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn tasks(&self) -> &DataDefinitionTaskRegistry {
        &self.tasks
    }

    pub fn memory_manager(&self) -> &Arc<ClusterMemoryManager> {
        &self.memory_manager
    }

    /// Submit a statement for execution
    ///
    /// The execution is created and registered before this returns; it runs
    /// in the background once a dispatch slot is free. Errors detected while
    /// creating the execution (unknown execution policy, invalid session
    /// properties) fail the submission itself, as does calling this outside
    /// a Tokio runtime.
    pub fn submit(
        &self,
        session: Session,
        statement: Statement,
        query_text: impl Into<String>,
        parameters: Vec<Expression>,
    ) -> Result<QueryId, ExecutionError> {
        let kind = statement.kind();
        let factory = self.factories.get(kind).ok_or_else(|| {
            ExecutionError::Internal(format!("No execution factory bound to {}", kind))
        })?;
        let runtime = Handle::try_current().map_err(|_| {
            ExecutionError::Internal("Query submission requires a Tokio runtime".to_string())
        })?;

        let query_id = self.id_generator.create_next_query_id();
        let request = QueryRequest {
            query_id: query_id.clone(),
            query_type: classify(kind),
            session,
            statement,
            query_text: query_text.into(),
            parameters,
        };
        log::debug!(
            "Query {} submitted by {} ({})",
            query_id,
            request.session.user(),
            request.query_type
        );

        let execution = factory.create_query_execution(request)?;
        self.queries.register(execution.clone())?;
        self.dispatch(&runtime, execution);
        Ok(query_id)
    }

    fn dispatch(&self, runtime: &Handle, execution: Arc<dyn QueryExecution>) {
        let permits = self.dispatch_permits.clone();
        runtime.spawn(async move {
            match permits.acquire_owned().await {
                Ok(_permit) => execution.start().await,
                Err(_) => execution.fail(ExecutionError::Internal(
                    "Coordinator is shutting down".to_string(),
                )),
            }
        });
    }

    pub fn query_info(&self, query_id: &QueryId) -> Option<QueryInfo> {
        self.queries.get(query_id).map(|execution| execution.query_info())
    }

    /// Every query still retained, oldest first
    pub fn list_queries(&self) -> Vec<QueryInfo> {
        self.queries.list()
    }

    /// Request cancellation. Cleanup happens asynchronously.
    pub fn cancel_query(&self, query_id: &QueryId) -> Result<(), ExecutionError> {
        let execution = self
            .queries
            .get(query_id)
            .ok_or_else(|| ExecutionError::QueryNotFound(query_id.clone()))?;
        log::info!("Canceling query {}", query_id);
        execution.cancel();
        Ok(())
    }

    /// Wait until the query reaches a terminal state
    pub async fn wait_for_completion(&self, query_id: &QueryId) -> Result<QueryInfo, ExecutionError> {
        let execution = self
            .queries
            .get(query_id)
            .ok_or_else(|| ExecutionError::QueryNotFound(query_id.clone()))?;
        execution.state_machine().wait_for_done().await;
        Ok(execution.query_info())
    }

    /// A worker reports that a stage of the query completed
    pub fn stage_finished(&self, query_id: &QueryId, stage: StageId) -> Result<(), ExecutionError> {
        self.queries
            .get(query_id)
            .ok_or_else(|| ExecutionError::QueryNotFound(query_id.clone()))?
            .stage_finished(stage)
    }

    /// Describe how a statement would execute, without executing it
    pub async fn explain(
        &self,
        session: &Session,
        statement: &Statement,
        parameters: &[Expression],
    ) -> Result<String, ExecutionError> {
        let kind = statement.kind();
        let factory = self.factories.get(kind).ok_or_else(|| {
            ExecutionError::Internal(format!("No execution factory bound to {}", kind))
        })?;
        factory.explain(session, statement, parameters).await
    }

    /// Evict queries that finished longer than the retention period ago
    pub fn remove_expired_queries(&self) -> Vec<QueryId> {
        self.queries.remove_expired(self.config.query_retention)
    }

    /// Spawn the retention sweep and the cluster memory manager
    pub fn start_background_tasks(&self) {
        let mut background = self.background.lock();
        if !background.is_empty() {
            return;
        }

        let queries = self.queries.clone();
        let retention = self.config.query_retention;
        let sweep_interval = self.config.retention_sweep_interval;
        background.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                queries.remove_expired(retention);
            }
        }));
        background.push(self.memory_manager.clone().start());
    }

    /// Stop background services and refuse further dispatch. Queries
    /// still waiting for a dispatch slot fail.
    pub fn shutdown(&self) {
        for handle in self.background.lock().drain(..) {
            handle.abort();
        }
        self.dispatch_permits.close();
        log::info!("Coordinator shut down");
    }
}

impl Drop for QueryCoordinator {
    fn drop(&mut self) {
        for handle in self.background.get_mut().drain(..) {
            handle.abort();
        }
    }
}
