// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::write_stmt::transaction::transaction_base::session_transaction;
use crate::exec::ExecutionError;
use crate::session::SessionUpdate;

pub struct RollbackTask;

impl DataDefinitionTask for RollbackTask {
    fn name(&self) -> &'static str {
        "ROLLBACK"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Rollback
    }

    fn requires_write_permission(&self) -> bool {
        false
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        if !matches!(statement, Statement::Rollback(_)) {
            return Err(unexpected_statement(self.name(), statement));
        }
        let id = session_transaction(statement, context)?;
        context.transaction_manager.rollback(id)?;
        Ok(TaskOutcome::with_update(SessionUpdate::ClearTransaction))
    }
}
