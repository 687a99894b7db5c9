// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Expression, Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_model_name, unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for CREATE MODEL statements
pub struct CreateModelTask;

impl DataDefinitionTask for CreateModelTask {
    fn name(&self) -> &'static str {
        "CREATE MODEL"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::CreateModel
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::CreateModel(create) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let (catalog, model) = create_model_name(statement, &create.model_name)?;

        context
            .access_control
            .check_can_create_model(&context.session.identity, &catalog, &model)?;
        context
            .metadata
            .create_model(context.session, &catalog, &model)?;
        Ok(TaskOutcome::done())
    }

    fn explain(&self, statement: &Statement, _parameters: &[Expression]) -> String {
        match statement {
            Statement::CreateModel(create) => format!("CREATE MODEL {}", create.model_name),
            other => crate::ast::format_statement(other),
        }
    }
}
