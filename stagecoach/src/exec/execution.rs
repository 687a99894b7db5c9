// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution abstractions
//!
//! Every submitted statement becomes one [`QueryExecution`], created by the
//! [`QueryExecutionFactory`] bound to its statement kind.

use async_trait::async_trait;

use super::error::ExecutionError;
use super::query_state::{QueryState, QueryStateMachine};
use crate::ast::{Expression, Statement, StatementKind};
use crate::coordinator::{QueryId, QueryType};
use crate::memory::DataSize;
use crate::scheduler::StageId;
use crate::session::{Session, SessionUpdate};

/// Everything needed to create an execution for one submission
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub query_id: QueryId,
    pub session: Session,
    pub statement: Statement,
    pub query_text: String,
    pub parameters: Vec<Expression>,
    pub query_type: QueryType,
}

/// Snapshot of a query for listing and inspection
#[derive(Debug, Clone)]
pub struct QueryInfo {
    pub query_id: QueryId,
    pub state: QueryState,
    pub query_type: QueryType,
    pub statement_kind: StatementKind,
    pub query_text: String,
    pub user: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    /// Session changes produced by a successful data-definition statement
    pub session_updates: Vec<SessionUpdate>,
    pub error: Option<ExecutionError>,
    pub execution_policy: Option<String>,
    /// Stages in the order they were started
    pub stage_start_order: Vec<StageId>,
}

impl QueryInfo {
    pub(crate) fn from_request(request: &QueryRequest, state: &QueryStateMachine) -> Self {
        Self {
            query_id: request.query_id.clone(),
            state: state.state(),
            query_type: request.query_type,
            statement_kind: request.statement.kind(),
            query_text: request.query_text.clone(),
            user: request.session.user().to_string(),
            created_at: state.created_at(),
            end_time: state.end_time(),
            session_updates: Vec::new(),
            error: state.failure(),
            execution_policy: None,
            stage_start_order: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }
}

#[async_trait]
pub trait QueryExecution: Send + Sync {
    fn query_id(&self) -> &QueryId;

    fn state_machine(&self) -> &QueryStateMachine;

    fn state(&self) -> QueryState {
        self.state_machine().state()
    }

    fn query_info(&self) -> QueryInfo;

    /// Per-query memory limit requested by the session
    fn memory_limit(&self) -> Option<DataSize>;

    /// Drive the execution until every stage is started or the
    /// statement is done
    async fn start(&self);

    /// Cancel the query. Cleanup happens in the background.
    fn cancel(&self);

    /// Fail the query with `error` unless it is already done
    fn fail(&self, error: ExecutionError);

    /// A worker reported that `stage` completed
    fn stage_finished(&self, stage: StageId) -> Result<(), ExecutionError>;
}

#[async_trait]
pub trait QueryExecutionFactory: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this factory executes data-definition statements
    fn is_data_definition(&self) -> bool;

    fn create_query_execution(
        &self,
        request: QueryRequest,
    ) -> Result<std::sync::Arc<dyn QueryExecution>, ExecutionError>;

    /// Describe how the statement would execute, without side effects
    async fn explain(
        &self,
        session: &Session,
        statement: &Statement,
        parameters: &[Expression],
    ) -> Result<String, ExecutionError>;
}
