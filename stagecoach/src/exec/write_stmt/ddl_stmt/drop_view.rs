// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, unexpected_statement, DataDefinitionTask, DdlContext,
    TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for DROP VIEW statements
pub struct DropViewTask;

impl DataDefinitionTask for DropViewTask {
    fn name(&self) -> &'static str {
        "DROP VIEW"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropView
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::DropView(drop) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let view = create_qualified_object_name(context.session, statement, &drop.name)?;

        if drop.if_exists && !context.metadata.view_exists(context.session, &view) {
            return Ok(TaskOutcome::done());
        }

        context
            .access_control
            .check_can_drop_view(&context.session.identity, &view)?;
        context.metadata.drop_view(context.session, &view)?;
        Ok(TaskOutcome::done())
    }
}
