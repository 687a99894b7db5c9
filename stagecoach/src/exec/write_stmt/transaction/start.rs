// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{IsolationLevel, Statement, StatementKind};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;
use crate::session::SessionUpdate;

pub struct StartTransactionTask;

impl DataDefinitionTask for StartTransactionTask {
    fn name(&self) -> &'static str {
        "START TRANSACTION"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::StartTransaction
    }

    fn requires_write_permission(&self) -> bool {
        false // Transaction control manages transaction state, not metadata
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::StartTransaction(start) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        if context.session.transaction_id.is_some() {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::InvalidTransactionState,
                statement,
                "Nested transactions not supported",
            ));
        }

        let id = context.transaction_manager.begin_transaction(
            start.isolation_level.unwrap_or(IsolationLevel::ReadCommitted),
            start.read_only.unwrap_or(false),
            false,
        )?;
        Ok(TaskOutcome::with_update(SessionUpdate::StartedTransaction(id)))
    }
}
