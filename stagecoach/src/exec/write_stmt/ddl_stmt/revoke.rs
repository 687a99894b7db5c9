// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::write_stmt::ddl_stmt::grant::privilege_set;
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, unexpected_statement, DataDefinitionTask, DdlContext,
    TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for REVOKE statements
pub struct RevokeTask;

impl DataDefinitionTask for RevokeTask {
    fn name(&self) -> &'static str {
        "REVOKE"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Revoke
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::Revoke(revoke) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let table = create_qualified_object_name(context.session, statement, &revoke.table)?;
        let privileges = privilege_set(&revoke.privileges);

        context.access_control.check_can_revoke_table_privileges(
            &context.session.identity,
            &table,
            &privileges,
            &revoke.grantee,
        )?;
        context.metadata.revoke_table_privileges(
            context.session,
            &table,
            &privileges,
            &revoke.grantee,
            revoke.grant_option_for,
        )?;
        Ok(TaskOutcome::done())
    }
}
