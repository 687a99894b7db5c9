// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution of data-definition statements
//!
//! A [`DataDefinitionExecution`] wraps one [`DataDefinitionTask`] in the
//! regular query lifecycle so that DDL shows up in query listings and can be
//! canceled like any other query. Transaction boundaries are handled here,
//! not by the task.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use super::error::{ExecutionError, SemanticErrorCode};
use super::execution::{QueryExecution, QueryExecutionFactory, QueryInfo, QueryRequest};
use super::query_state::{QueryState, QueryStateMachine};
use super::write_stmt::{DataDefinitionTask, DataDefinitionTaskRegistry, DdlContext};
use crate::ast::{Expression, IsolationLevel, Statement};
use crate::catalog::{AccessControl, Metadata};
use crate::coordinator::QueryId;
use crate::memory::DataSize;
use crate::scheduler::StageId;
use crate::session::{Session, SessionUpdate};
use crate::txn::{TransactionId, TransactionManager};

/// Shared collaborators of every data-definition execution
#[derive(Clone)]
struct DdlServices {
    metadata: Arc<dyn Metadata>,
    access_control: Arc<dyn AccessControl>,
    transaction_manager: Arc<dyn TransactionManager>,
}

pub struct DataDefinitionExecution {
    request: QueryRequest,
    task: Arc<dyn DataDefinitionTask>,
    services: DdlServices,
    state: QueryStateMachine,
    updates: Mutex<Vec<SessionUpdate>>,
}

impl DataDefinitionExecution {
    /// Begin an auto-commit transaction unless the statement runs inside the
    /// session's transaction or manages transactions itself
    fn begin_auto_commit(&self) -> Result<Option<TransactionId>, ExecutionError> {
        let session = &self.request.session;
        if session.transaction_id.is_some() || self.task.kind().is_transaction_control() {
            return Ok(None);
        }
        let id = self.services.transaction_manager.begin_transaction(
            IsolationLevel::ReadCommitted,
            false,
            true,
        )?;
        Ok(Some(id))
    }

    fn run_task(&self) -> Result<Vec<SessionUpdate>, ExecutionError> {
        let auto_commit = self.begin_auto_commit()?;
        let context = DdlContext {
            session: &self.request.session,
            parameters: &self.request.parameters,
            metadata: self.services.metadata.as_ref(),
            access_control: self.services.access_control.as_ref(),
            transaction_manager: self.services.transaction_manager.as_ref(),
            transaction_id: auto_commit.or(self.request.session.transaction_id),
        };

        match self.task.execute(&self.request.statement, &context) {
            Ok(outcome) => {
                if let Some(id) = auto_commit {
                    self.services.transaction_manager.commit(id)?;
                }
                Ok(outcome.updates)
            }
            Err(error) => {
                if let Some(id) = auto_commit {
                    if let Err(rollback_error) = self.services.transaction_manager.rollback(id) {
                        log::warn!(
                            "Failed to roll back transaction {} of query {}: {}",
                            id,
                            self.request.query_id,
                            rollback_error
                        );
                    }
                }
                Err(error)
            }
        }
    }
}

#[async_trait]
impl QueryExecution for DataDefinitionExecution {
    fn query_id(&self) -> &QueryId {
        &self.request.query_id
    }

    fn state_machine(&self) -> &QueryStateMachine {
        &self.state
    }

    fn query_info(&self) -> QueryInfo {
        let mut info = QueryInfo::from_request(&self.request, &self.state);
        info.session_updates = self.updates.lock().clone();
        info
    }

    fn memory_limit(&self) -> Option<DataSize> {
        None
    }

    async fn start(&self) {
        if !self.state.transition_to(QueryState::Running) {
            return;
        }

        match self.run_task() {
            Ok(updates) => {
                *self.updates.lock() = updates;
                self.state.transition_to(QueryState::Finishing);
                self.state.finish();
            }
            Err(error) => {
                if error.is_expected_conflict() {
                    log::debug!(
                        "{} failed for query {}: {}",
                        self.task.name(),
                        self.request.query_id,
                        error
                    );
                } else {
                    log::error!(
                        "{} failed for query {}: {}",
                        self.task.name(),
                        self.request.query_id,
                        error
                    );
                }
                self.state.fail(error);
            }
        }
    }

    fn cancel(&self) {
        self.state
            .cancel(ExecutionError::Canceled("canceled by user".to_string()));
    }

    fn fail(&self, error: ExecutionError) {
        self.state.fail(error);
    }

    fn stage_finished(&self, stage: StageId) -> Result<(), ExecutionError> {
        Err(ExecutionError::Internal(format!(
            "Data definition query {} has no stage {}",
            self.request.query_id, stage
        )))
    }
}

/// Generic factory bound to every data-definition statement kind
pub struct DataDefinitionExecutionFactory {
    services: DdlServices,
    tasks: Arc<DataDefinitionTaskRegistry>,
}

impl DataDefinitionExecutionFactory {
    pub fn new(
        metadata: Arc<dyn Metadata>,
        access_control: Arc<dyn AccessControl>,
        transaction_manager: Arc<dyn TransactionManager>,
        tasks: Arc<DataDefinitionTaskRegistry>,
    ) -> Self {
        Self {
            services: DdlServices {
                metadata,
                access_control,
                transaction_manager,
            },
            tasks,
        }
    }

    pub fn tasks(&self) -> &DataDefinitionTaskRegistry {
        &self.tasks
    }

    fn task_for(&self, statement: &Statement) -> Result<Arc<dyn DataDefinitionTask>, ExecutionError> {
        self.tasks.get(statement.kind()).ok_or_else(|| {
            ExecutionError::semantic(
                SemanticErrorCode::NotSupported,
                statement,
                format!("No data definition task for {} statement", statement.kind()),
            )
        })
    }
}

#[async_trait]
impl QueryExecutionFactory for DataDefinitionExecutionFactory {
    fn name(&self) -> &'static str {
        "data-definition"
    }

    fn is_data_definition(&self) -> bool {
        true
    }

    fn create_query_execution(
        &self,
        request: QueryRequest,
    ) -> Result<Arc<dyn QueryExecution>, ExecutionError> {
        let task = self.task_for(&request.statement)?;
        let state = QueryStateMachine::new(request.query_id.clone());
        Ok(Arc::new(DataDefinitionExecution {
            request,
            task,
            services: self.services.clone(),
            state,
            updates: Mutex::new(Vec::new()),
        }))
    }

    async fn explain(
        &self,
        _session: &Session,
        statement: &Statement,
        parameters: &[Expression],
    ) -> Result<String, ExecutionError> {
        let task = self.task_for(statement)?;
        Ok(task.explain(statement, parameters))
    }
}
