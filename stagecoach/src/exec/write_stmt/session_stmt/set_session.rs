// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Expression, Statement, StatementKind};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    require_catalog, resolve_expression, unexpected_statement, DataDefinitionTask, DdlContext,
    TaskOutcome,
};
use crate::exec::ExecutionError;
use crate::session::{validate_system_property, SessionUpdate};

/// Task for SET SESSION statements
///
/// `SET SESSION name = value` sets a system property, `SET SESSION
/// catalog.name = value` a property of that catalog. The new value is
/// returned as a session update.
pub struct SetSessionTask;

fn literal_value(
    statement: &Statement,
    property: &str,
    value: &Expression,
) -> Result<String, ExecutionError> {
    match value {
        Expression::StringLiteral(s) => Ok(s.clone()),
        Expression::LongLiteral(n) => Ok(n.to_string()),
        Expression::DoubleLiteral(d) => Ok(d.to_string()),
        Expression::BooleanLiteral(b) => Ok(b.to_string()),
        Expression::NullLiteral | Expression::Parameter(_) => Err(ExecutionError::semantic(
            SemanticErrorCode::InvalidSessionProperty,
            statement,
            format!("Session property {} must not be null", property),
        )),
    }
}

impl DataDefinitionTask for SetSessionTask {
    fn name(&self) -> &'static str {
        "SET SESSION"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::SetSession
    }

    fn requires_write_permission(&self) -> bool {
        false
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::SetSession(set) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let value = resolve_expression(statement, &set.value, context.parameters)?;
        let value = literal_value(statement, &set.name.to_string(), value)?;
        let identity = &context.session.identity;

        match set.name.parts() {
            [name] => {
                validate_system_property(name, &value).map_err(|message| {
                    ExecutionError::semantic(
                        SemanticErrorCode::InvalidSessionProperty,
                        statement,
                        message,
                    )
                })?;
                context
                    .access_control
                    .check_can_set_system_session_property(identity, name)?;
                Ok(TaskOutcome::with_update(SessionUpdate::SetSystemProperty {
                    name: name.clone(),
                    value,
                }))
            }
            [catalog, name] => {
                require_catalog(context, statement, catalog)?;
                context
                    .access_control
                    .check_can_set_catalog_session_property(identity, catalog, name)?;
                Ok(TaskOutcome::with_update(SessionUpdate::SetCatalogProperty {
                    catalog: catalog.clone(),
                    name: name.clone(),
                    value,
                }))
            }
            _ => Err(ExecutionError::semantic(
                SemanticErrorCode::InvalidSessionProperty,
                statement,
                format!("Invalid session property '{}'", set.name),
            )),
        }
    }
}
