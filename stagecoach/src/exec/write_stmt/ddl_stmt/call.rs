// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, require_catalog, resolve_expression, unexpected_statement,
    DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for CALL statements
///
/// Arguments are bound from the statement parameters before the procedure
/// runs, so the procedure only ever sees literals.
pub struct CallTask;

impl DataDefinitionTask for CallTask {
    fn name(&self) -> &'static str {
        "CALL"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Call
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::Call(call) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let procedure = create_qualified_object_name(context.session, statement, &call.name)?;
        require_catalog(context, statement, &procedure.catalog)?;

        let arguments = call
            .arguments
            .iter()
            .map(|argument| resolve_expression(statement, argument, context.parameters).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        context
            .metadata
            .call_procedure(context.session, &procedure, &arguments)?;
        Ok(TaskOutcome::done())
    }
}
