// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution of distributed queries
//!
//! Planning and the actual task placement on workers are external
//! collaborators ([`QueryPlanner`], [`StageLauncher`]). This module owns the
//! lifecycle: it obtains the stage graph, asks the selected execution policy
//! in which order stages may start and tracks stage completion.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::error::{ExecutionError, SemanticErrorCode};
use super::execution::{QueryExecution, QueryExecutionFactory, QueryInfo, QueryRequest};
use super::query_state::{QueryState, QueryStateMachine};
use crate::ast::{Expression, Statement};
use crate::coordinator::QueryId;
use crate::memory::DataSize;
use crate::scheduler::{
    ExecutionPolicy, ExecutionPolicyRegistry, ExecutionSchedule, StageDescriptor, StageGraph,
    StageId,
};
use crate::session::Session;

/// Produces the stage graph of a statement
#[async_trait]
pub trait QueryPlanner: Send + Sync {
    async fn plan(
        &self,
        session: &Session,
        statement: &Statement,
        parameters: &[Expression],
    ) -> Result<StageGraph, ExecutionError>;
}

/// Places stages on worker nodes
#[async_trait]
pub trait StageLauncher: Send + Sync {
    async fn launch_stage(
        &self,
        query_id: &QueryId,
        stage: &StageDescriptor,
    ) -> Result<(), ExecutionError>;

    /// Best-effort abort of every stage of the query
    async fn abort_query(&self, query_id: &QueryId);
}

#[derive(Default)]
struct StageProgress {
    graph: Option<StageGraph>,
    started: Vec<StageId>,
    finished: BTreeSet<StageId>,
}

impl StageProgress {
    fn all_finished(&self) -> bool {
        self.graph
            .as_ref()
            .map_or(false, |graph| self.finished.len() == graph.len())
    }
}

pub struct SqlQueryExecution {
    request: QueryRequest,
    planner: Arc<dyn QueryPlanner>,
    launcher: Arc<dyn StageLauncher>,
    policy: Arc<dyn ExecutionPolicy>,
    memory_limit: DataSize,
    state: QueryStateMachine,
    progress: Mutex<StageProgress>,
}

impl SqlQueryExecution {
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    async fn schedule_stages(
        &self,
        graph: &StageGraph,
        mut schedule: Box<dyn ExecutionSchedule>,
    ) -> Result<(), ExecutionError> {
        while !schedule.is_finished() {
            let stages = schedule.next_stages();
            if stages.is_empty() {
                return Err(ExecutionError::Scheduling(format!(
                    "{} schedule released no stage before finishing",
                    self.policy.name()
                )));
            }
            for stage in stages {
                if self.state.state().is_done() {
                    return Ok(());
                }
                let descriptor = graph.stage(stage).ok_or_else(|| {
                    ExecutionError::Scheduling(format!("Unknown stage {}", stage))
                })?;
                self.launcher
                    .launch_stage(&self.request.query_id, descriptor)
                    .await?;
                schedule.stage_started(stage);
                self.progress.lock().started.push(stage);
                log::debug!("Started stage {} of query {}", stage, self.request.query_id);
            }
        }
        Ok(())
    }

    async fn run(&self) -> Result<(), ExecutionError> {
        let graph = self
            .planner
            .plan(
                &self.request.session,
                &self.request.statement,
                &self.request.parameters,
            )
            .await?;

        if !self.state.transition_to(QueryState::Starting) {
            return Ok(());
        }
        let schedule = self.policy.create_execution_schedule(&graph);
        self.progress.lock().graph = Some(graph.clone());
        self.schedule_stages(&graph, schedule).await?;

        if self.state.transition_to(QueryState::Running) && self.progress.lock().all_finished() {
            self.state.transition_to(QueryState::Finishing);
            self.state.finish();
        }
        Ok(())
    }

    fn abort_in_background(&self) {
        let launcher = self.launcher.clone();
        let query_id = self.request.query_id.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { launcher.abort_query(&query_id).await });
            }
            Err(_) => log::warn!("No runtime available to abort stages of query {}", query_id),
        }
    }
}

#[async_trait]
impl QueryExecution for SqlQueryExecution {
    fn query_id(&self) -> &QueryId {
        &self.request.query_id
    }

    fn state_machine(&self) -> &QueryStateMachine {
        &self.state
    }

    fn query_info(&self) -> QueryInfo {
        let mut info = QueryInfo::from_request(&self.request, &self.state);
        info.execution_policy = Some(self.policy.name().to_string());
        info.stage_start_order = self.progress.lock().started.clone();
        info
    }

    fn memory_limit(&self) -> Option<DataSize> {
        Some(self.memory_limit)
    }

    async fn start(&self) {
        if !self.state.transition_to(QueryState::Planning) {
            return;
        }
        if let Err(error) = self.run().await {
            log::warn!("Query {} failed: {}", self.request.query_id, error);
            if self.state.fail(error) {
                self.abort_in_background();
            }
        }
    }

    fn cancel(&self) {
        if self
            .state
            .cancel(ExecutionError::Canceled("canceled by user".to_string()))
        {
            self.abort_in_background();
        }
    }

    fn fail(&self, error: ExecutionError) {
        if self.state.fail(error) {
            self.abort_in_background();
        }
    }

    fn stage_finished(&self, stage: StageId) -> Result<(), ExecutionError> {
        let all_finished = {
            let mut progress = self.progress.lock();
            let known = progress
                .graph
                .as_ref()
                .map_or(false, |graph| graph.stage(stage).is_some());
            if !known {
                return Err(ExecutionError::Scheduling(format!(
                    "Query {} has no stage {}",
                    self.request.query_id, stage
                )));
            }
            progress.finished.insert(stage);
            progress.all_finished()
        };

        if all_finished && self.state.state() == QueryState::Running {
            self.state.transition_to(QueryState::Finishing);
            self.state.finish();
        }
        Ok(())
    }
}

/// Factory for every statement that is not data definition
pub struct SqlQueryExecutionFactory {
    planner: Arc<dyn QueryPlanner>,
    launcher: Arc<dyn StageLauncher>,
    policies: Arc<ExecutionPolicyRegistry>,
    default_policy: String,
    default_query_max_memory: DataSize,
}

impl SqlQueryExecutionFactory {
    pub fn new(
        planner: Arc<dyn QueryPlanner>,
        launcher: Arc<dyn StageLauncher>,
        policies: Arc<ExecutionPolicyRegistry>,
        default_policy: impl Into<String>,
        default_query_max_memory: DataSize,
    ) -> Self {
        Self {
            planner,
            launcher,
            policies,
            default_policy: default_policy.into(),
            default_query_max_memory,
        }
    }

    /// Session property first, configured default otherwise
    fn select_policy(
        &self,
        session: &Session,
        statement: &Statement,
    ) -> Result<Arc<dyn ExecutionPolicy>, ExecutionError> {
        let name = session
            .execution_policy()
            .unwrap_or(self.default_policy.as_str());
        self.policies.get(name).ok_or_else(|| {
            ExecutionError::semantic(
                SemanticErrorCode::InvalidExecutionPolicy,
                statement,
                format!("No execution policy {}", name),
            )
        })
    }

    fn memory_limit(
        &self,
        session: &Session,
        statement: &Statement,
    ) -> Result<DataSize, ExecutionError> {
        let limit = session.query_max_memory().map_err(|message| {
            ExecutionError::semantic(SemanticErrorCode::InvalidSessionProperty, statement, message)
        })?;
        Ok(limit.unwrap_or(self.default_query_max_memory))
    }
}

#[async_trait]
impl QueryExecutionFactory for SqlQueryExecutionFactory {
    fn name(&self) -> &'static str {
        "sql-query"
    }

    fn is_data_definition(&self) -> bool {
        false
    }

    fn create_query_execution(
        &self,
        request: QueryRequest,
    ) -> Result<Arc<dyn QueryExecution>, ExecutionError> {
        let policy = self.select_policy(&request.session, &request.statement)?;
        let memory_limit = self.memory_limit(&request.session, &request.statement)?;
        let state = QueryStateMachine::new(request.query_id.clone());
        Ok(Arc::new(SqlQueryExecution {
            request,
            planner: self.planner.clone(),
            launcher: self.launcher.clone(),
            policy,
            memory_limit,
            state,
            progress: Mutex::new(StageProgress::default()),
        }))
    }

    async fn explain(
        &self,
        session: &Session,
        statement: &Statement,
        parameters: &[Expression],
    ) -> Result<String, ExecutionError> {
        let policy = self.select_policy(session, statement)?;
        let graph = self.planner.plan(session, statement, parameters).await?;
        Ok(format!(
            "Execution policy: {}\n{}",
            policy.name(),
            graph.render()
        ))
    }
}
