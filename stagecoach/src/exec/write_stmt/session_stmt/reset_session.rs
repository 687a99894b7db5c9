// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    require_catalog, unexpected_statement, DataDefinitionTask, DdlContext, TaskOutcome,
};
use crate::exec::ExecutionError;
use crate::session::{system_session_property, SessionUpdate};

/// Task for RESET SESSION statements
pub struct ResetSessionTask;

impl DataDefinitionTask for ResetSessionTask {
    fn name(&self) -> &'static str {
        "RESET SESSION"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::ResetSession
    }

    fn requires_write_permission(&self) -> bool {
        false
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::ResetSession(reset) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };

        match reset.name.parts() {
            [name] => {
                if system_session_property(name).is_none() {
                    return Err(ExecutionError::semantic(
                        SemanticErrorCode::InvalidSessionProperty,
                        statement,
                        format!("Session property {} does not exist", name),
                    ));
                }
                Ok(TaskOutcome::with_update(SessionUpdate::ResetSystemProperty(
                    name.clone(),
                )))
            }
            [catalog, name] => {
                require_catalog(context, statement, catalog)?;
                Ok(TaskOutcome::with_update(SessionUpdate::ResetCatalogProperty {
                    catalog: catalog.clone(),
                    name: name.clone(),
                }))
            }
            _ => Err(ExecutionError::semantic(
                SemanticErrorCode::InvalidSessionProperty,
                statement,
                format!("Invalid session property '{}'", reset.name),
            )),
        }
    }
}
