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

/// Task for ALTER TABLE ... RENAME COLUMN statements
pub struct RenameColumnTask;

impl DataDefinitionTask for RenameColumnTask {
    fn name(&self) -> &'static str {
        "RENAME COLUMN"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::RenameColumn
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::RenameColumn(rename) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let table = create_qualified_object_name(context.session, statement, &rename.table)?;
        let existing = context
            .metadata
            .get_table(context.session, &table)
            .ok_or_else(|| MetadataError::TableNotFound(table.to_string()))?;

        if existing.column(&rename.source).is_none() {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::MissingColumn,
                statement,
                format!("Column '{}' does not exist", rename.source),
            ));
        }
        if existing.column(&rename.target).is_some() {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::ColumnAlreadyExists,
                statement,
                format!("Column '{}' already exists", rename.target),
            ));
        }

        context
            .access_control
            .check_can_rename_column(&context.session.identity, &table)?;
        context
            .metadata
            .rename_column(context.session, &table, &rename.source, &rename.target)?;
        Ok(TaskOutcome::done())
    }
}
