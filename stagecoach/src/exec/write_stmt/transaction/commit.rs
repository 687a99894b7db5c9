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

pub struct CommitTask;

impl DataDefinitionTask for CommitTask {
    fn name(&self) -> &'static str {
        "COMMIT"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Commit
    }

    fn requires_write_permission(&self) -> bool {
        false
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        if !matches!(statement, Statement::Commit(_)) {
            return Err(unexpected_statement(self.name(), statement));
        }
        let id = session_transaction(statement, context)?;
        context.transaction_manager.commit(id)?;
        Ok(TaskOutcome::with_update(SessionUpdate::ClearTransaction))
    }
}
