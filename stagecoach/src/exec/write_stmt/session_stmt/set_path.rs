// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    require_catalog, unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;
use crate::session::SessionUpdate;

/// Task for SET PATH statements
pub struct SetPathTask;

impl DataDefinitionTask for SetPathTask {
    fn name(&self) -> &'static str {
        "SET PATH"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::SetPath
    }

    fn requires_write_permission(&self) -> bool {
        false
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::SetPath(set) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };

        let mut path = Vec::with_capacity(set.path.len());
        for element in &set.path {
            let (catalog, schema) = match (element.parts(), &context.session.catalog) {
                ([catalog, schema], _) => (catalog.clone(), schema.clone()),
                ([schema], Some(catalog)) => (catalog.clone(), schema.clone()),
                ([_], None) => {
                    return Err(ExecutionError::semantic(
                        SemanticErrorCode::MissingCatalog,
                        statement,
                        "Catalog must be specified for each path element when session catalog is not set",
                    ))
                }
                _ => {
                    return Err(ExecutionError::semantic(
                        SemanticErrorCode::InvalidName,
                        statement,
                        format!("Invalid path element: {}", element),
                    ))
                }
            };
            require_catalog(context, statement, &catalog)?;
            path.push(format!("{}.{}", catalog, schema));
        }

        Ok(TaskOutcome::with_update(SessionUpdate::SetPath(path)))
    }
}
