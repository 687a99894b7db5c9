// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::catalog::{ColumnMetadata, MetadataError};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, unexpected_statement, DataDefinitionTask, DdlContext,
    TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for ALTER TABLE ... ADD COLUMN statements
pub struct AddColumnTask;

impl DataDefinitionTask for AddColumnTask {
    fn name(&self) -> &'static str {
        "ADD COLUMN"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::AddColumn
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::AddColumn(add) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let table = create_qualified_object_name(context.session, statement, &add.table)?;
        let existing = context
            .metadata
            .get_table(context.session, &table)
            .ok_or_else(|| MetadataError::TableNotFound(table.to_string()))?;

        if existing.column(&add.column.name).is_some() {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::ColumnAlreadyExists,
                statement,
                format!("Column '{}' already exists", add.column.name),
            ));
        }

        context
            .access_control
            .check_can_add_column(&context.session.identity, &table)?;

        let column = ColumnMetadata {
            name: add.column.name.clone(),
            data_type: add.column.data_type.clone(),
            nullable: add.column.nullable,
        };
        context.metadata.add_column(context.session, &table, &column)?;
        Ok(TaskOutcome::done())
    }
}
