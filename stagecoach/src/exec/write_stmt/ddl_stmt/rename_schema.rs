// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_catalog_schema_name, unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for ALTER SCHEMA ... RENAME TO statements
pub struct RenameSchemaTask;

impl DataDefinitionTask for RenameSchemaTask {
    fn name(&self) -> &'static str {
        "RENAME SCHEMA"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::RenameSchema
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::RenameSchema(rename) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let source = create_catalog_schema_name(context.session, statement, &rename.source)?;

        context.access_control.check_can_rename_schema(
            &context.session.identity,
            &source,
            &rename.target,
        )?;
        context
            .metadata
            .rename_schema(context.session, &source, &rename.target)?;
        Ok(TaskOutcome::done())
    }
}
