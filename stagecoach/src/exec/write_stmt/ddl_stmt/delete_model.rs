// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_model_name, unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for DELETE MODEL statements
pub struct DeleteModelTask;

impl DataDefinitionTask for DeleteModelTask {
    fn name(&self) -> &'static str {
        "DELETE MODEL"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::DeleteModel
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::DeleteModel(delete) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let (catalog, model) = create_model_name(statement, &delete.model_name)?;

        context
            .access_control
            .check_can_drop_model(&context.session.identity, &catalog, &model)?;
        context.metadata.drop_model(context.session, &catalog, &model)?;
        Ok(TaskOutcome::done())
    }
}
