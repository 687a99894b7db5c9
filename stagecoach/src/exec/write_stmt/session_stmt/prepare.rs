// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{format_statement, Statement, StatementKind};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;
use crate::session::SessionUpdate;

/// Task for PREPARE statements
pub struct PrepareTask;

impl DataDefinitionTask for PrepareTask {
    fn name(&self) -> &'static str {
        "PREPARE"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Prepare
    }

    fn requires_write_permission(&self) -> bool {
        false
    }

    fn execute_task(
        &self,
        statement: &Statement,
        _context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::Prepare(prepare) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };

        let inner = prepare.statement.kind();
        if matches!(inner, StatementKind::Prepare | StatementKind::Deallocate) {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::NotSupported,
                statement,
                format!("Invalid statement type for prepared statement: {}", inner),
            ));
        }

        Ok(TaskOutcome::with_update(SessionUpdate::AddPreparedStatement {
            name: prepare.name.clone(),
            sql: format_statement(&prepare.statement),
        }))
    }
}
