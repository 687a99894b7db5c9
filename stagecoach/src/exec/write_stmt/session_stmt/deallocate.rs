// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;
use crate::session::SessionUpdate;

/// Task for DEALLOCATE PREPARE statements
pub struct DeallocateTask;

impl DataDefinitionTask for DeallocateTask {
    fn name(&self) -> &'static str {
        "DEALLOCATE"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Deallocate
    }

    fn requires_write_permission(&self) -> bool {
        false
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::Deallocate(deallocate) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };

        if context
            .session
            .prepared_statement(&deallocate.name)
            .is_none()
        {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::PreparedStatementNotFound,
                statement,
                format!("Prepared statement not found: {}", deallocate.name),
            ));
        }

        Ok(TaskOutcome::with_update(
            SessionUpdate::DeallocatePreparedStatement(deallocate.name.clone()),
        ))
    }
}
