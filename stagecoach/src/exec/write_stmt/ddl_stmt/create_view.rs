// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, require_catalog, unexpected_statement, DataDefinitionTask,
    DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for CREATE [OR REPLACE] VIEW statements
pub struct CreateViewTask;

impl DataDefinitionTask for CreateViewTask {
    fn name(&self) -> &'static str {
        "CREATE VIEW"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateView
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::CreateView(create) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let view = create_qualified_object_name(context.session, statement, &create.name)?;
        require_catalog(context, statement, &view.catalog)?;

        context
            .access_control
            .check_can_create_view(&context.session.identity, &view)?;
        context
            .metadata
            .create_view(context.session, &view, &create.query.sql, create.replace)?;
        Ok(TaskOutcome::done())
    }
}
