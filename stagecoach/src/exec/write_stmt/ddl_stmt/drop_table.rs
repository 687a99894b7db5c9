// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, unexpected_statement, DataDefinitionTask, DdlContext,
    TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for DROP TABLE statements
pub struct DropTableTask;

impl DataDefinitionTask for DropTableTask {
    fn name(&self) -> &'static str {
        "DROP TABLE"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DropTable
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::DropTable(drop) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let table = create_qualified_object_name(context.session, statement, &drop.name)?;

        if drop.if_exists && !context.metadata.table_exists(context.session, &table) {
            return Ok(TaskOutcome::done());
        }

        context
            .access_control
            .check_can_drop_table(&context.session.identity, &table)?;
        context.metadata.drop_table(context.session, &table)?;
        Ok(TaskOutcome::done())
    }
}
