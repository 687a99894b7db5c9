// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_catalog_schema_name, unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for DROP SCHEMA statements
pub struct DropSchemaTask;

impl DataDefinitionTask for DropSchemaTask {
    fn name(&self) -> &'static str {
        "DROP SCHEMA"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropSchema
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::DropSchema(drop) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let schema = create_catalog_schema_name(context.session, statement, &drop.name)?;

        if drop.if_exists && !context.metadata.schema_exists(context.session, &schema) {
            return Ok(TaskOutcome::done());
        }

        context
            .access_control
            .check_can_drop_schema(&context.session.identity, &schema)?;
        context
            .metadata
            .drop_schema(context.session, &schema, drop.cascade)?;
        Ok(TaskOutcome::done())
    }
}
