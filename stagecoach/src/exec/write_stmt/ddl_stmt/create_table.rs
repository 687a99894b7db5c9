// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use std::collections::HashSet;

use crate::ast::{Statement, StatementKind};
use crate::catalog::{ColumnMetadata, TableMetadata};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, require_catalog, unexpected_statement, DataDefinitionTask,
    DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for CREATE TABLE statements
pub struct CreateTableTask;

impl DataDefinitionTask for CreateTableTask {
    fn name(&self) -> &'static str {
        "CREATE TABLE"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateTable
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::CreateTable(create) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let table = create_qualified_object_name(context.session, statement, &create.name)?;
        require_catalog(context, statement, &table.catalog)?;

        if create.columns.is_empty() {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::NotSupported,
                statement,
                format!("Table {} must have at least one column", table),
            ));
        }

        let mut seen = HashSet::new();
        for column in &create.columns {
            if !seen.insert(column.name.to_lowercase()) {
                return Err(ExecutionError::semantic(
                    SemanticErrorCode::DuplicateColumnName,
                    statement,
                    format!("Column name '{}' specified more than once", column.name),
                ));
            }
        }

        if create.if_not_exists && context.metadata.table_exists(context.session, &table) {
            return Ok(TaskOutcome::done());
        }

        context
            .access_control
            .check_can_create_table(&context.session.identity, &table)?;

        let metadata = TableMetadata {
            name: table,
            columns: create
                .columns
                .iter()
                .map(|column| ColumnMetadata {
                    name: column.name.clone(),
                    data_type: column.data_type.clone(),
                    nullable: column.nullable,
                })
                .collect(),
        };
        context
            .metadata
            .create_table(context.session, &metadata, create.if_not_exists)?;
        Ok(TaskOutcome::done())
    }
}
