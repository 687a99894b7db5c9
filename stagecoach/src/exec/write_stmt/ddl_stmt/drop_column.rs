// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::catalog::MetadataError;
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, unexpected_statement, DataDefinitionTask, DdlContext,
    TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for ALTER TABLE ... DROP COLUMN statements
pub struct DropColumnTask;

impl DataDefinitionTask for DropColumnTask {
    fn name(&self) -> &'static str {
        "DROP COLUMN"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropColumn
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::DropColumn(drop) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let table = create_qualified_object_name(context.session, statement, &drop.table)?;
        let existing = context
            .metadata
            .get_table(context.session, &table)
            .ok_or_else(|| MetadataError::TableNotFound(table.to_string()))?;

        if existing.column(&drop.column).is_none() {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::MissingColumn,
                statement,
                format!("Column '{}' does not exist", drop.column),
            ));
        }
        if existing.columns.len() == 1 {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::NotSupported,
                statement,
                "Cannot drop the only column in a table",
            ));
        }

        context
            .access_control
            .check_can_drop_column(&context.session.identity, &table)?;
        context
            .metadata
            .drop_column(context.session, &table, &drop.column)?;
        Ok(TaskOutcome::done())
    }
}
