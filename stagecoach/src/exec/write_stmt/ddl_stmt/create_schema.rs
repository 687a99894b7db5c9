// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::catalog::MetadataError;
use crate::exec::write_stmt::statement_base::{
    create_catalog_schema_name, require_catalog, unexpected_statement, DataDefinitionTask,
    DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for CREATE SCHEMA statements
pub struct CreateSchemaTask;

impl DataDefinitionTask for CreateSchemaTask {
    fn name(&self) -> &'static str {
        "CREATE SCHEMA"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateSchema
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::CreateSchema(create) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let schema = create_catalog_schema_name(context.session, statement, &create.name)?;
        require_catalog(context, statement, &schema.catalog)?;

        if create.if_not_exists && context.metadata.schema_exists(context.session, &schema) {
            log::debug!("Schema {} already exists, skipping", schema);
            return Ok(TaskOutcome::done());
        }

        context
            .access_control
            .check_can_create_schema(&context.session.identity, &schema)?;
        match context.metadata.create_schema(context.session, &schema) {
            Err(MetadataError::SchemaAlreadyExists(_)) if create.if_not_exists => {
                Ok(TaskOutcome::done())
            }
            result => {
                result?;
                Ok(TaskOutcome::done())
            }
        }
    }
}
