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

/// Task for USE statements
pub struct UseTask;

impl DataDefinitionTask for UseTask {
    fn name(&self) -> &'static str {
        "USE"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Use
    }

    fn requires_write_permission(&self) -> bool {
        false
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::Use(use_stmt) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };

        let catalog = match (&use_stmt.catalog, &context.session.catalog) {
            (Some(catalog), _) | (None, Some(catalog)) => catalog.clone(),
            (None, None) => {
                return Err(ExecutionError::semantic(
                    SemanticErrorCode::MissingCatalog,
                    statement,
                    "Catalog must be specified when session catalog is not set",
                ))
            }
        };
        require_catalog(context, statement, &catalog)?;

        let mut updates = Vec::new();
        if use_stmt.catalog.is_some() {
            updates.push(SessionUpdate::SetCatalog(catalog));
        }
        updates.push(SessionUpdate::SetSchema(use_stmt.schema.clone()));
        Ok(TaskOutcome::with_updates(updates))
    }
}
