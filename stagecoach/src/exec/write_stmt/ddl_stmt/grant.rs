// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use std::collections::BTreeSet;

use crate::ast::{Privilege, Statement, StatementKind};
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, unexpected_statement, DataDefinitionTask, DdlContext,
    TaskOutcome,
};
use crate::exec::ExecutionError;

/// Expand an optional privilege list, `None` meaning ALL PRIVILEGES
pub(crate) fn privilege_set(privileges: &Option<Vec<Privilege>>) -> BTreeSet<Privilege> {
    match privileges {
        Some(list) => list.iter().copied().collect(),
        None => [
            Privilege::Select,
            Privilege::Insert,
            Privilege::Delete,
            Privilege::Update,
        ]
        .into_iter()
        .collect(),
    }
}

/// Task for GRANT statements
pub struct GrantTask;

impl DataDefinitionTask for GrantTask {
    fn name(&self) -> &'static str {
        "GRANT"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Grant
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::Grant(grant) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let table = create_qualified_object_name(context.session, statement, &grant.table)?;
        let privileges = privilege_set(&grant.privileges);

        context.access_control.check_can_grant_table_privileges(
            &context.session.identity,
            &table,
            &privileges,
            &grant.grantee,
        )?;
        context.metadata.grant_table_privileges(
            context.session,
            &table,
            &privileges,
            &grant.grantee,
            grant.with_grant_option,
        )?;
        Ok(TaskOutcome::done())
    }
}
