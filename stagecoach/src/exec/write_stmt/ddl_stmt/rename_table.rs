// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Statement, StatementKind};
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::{
    create_qualified_object_name, unexpected_statement, DataDefinitionTask, DdlContext,
    TaskOutcome,
};
use crate::exec::ExecutionError;

/// Task for ALTER TABLE ... RENAME TO statements
pub struct RenameTableTask;

impl DataDefinitionTask for RenameTableTask {
    fn name(&self) -> &'static str {
        "RENAME TABLE"
    }

    fn kind(&self) -> StatementKind {
        StatementKind::RenameTable
    }

    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        let Statement::RenameTable(rename) = statement else {
            return Err(unexpected_statement(self.name(), statement));
        };
        let source = create_qualified_object_name(context.session, statement, &rename.source)?;
        let target = create_qualified_object_name(context.session, statement, &rename.target)?;

        if source.catalog != target.catalog {
            return Err(ExecutionError::semantic(
                SemanticErrorCode::NotSupported,
                statement,
                "Table rename across catalogs is not supported",
            ));
        }

        context
            .access_control
            .check_can_rename_table(&context.session.identity, &source, &target)?;
        context
            .metadata
            .rename_table(context.session, &source, &target)?;
        Ok(TaskOutcome::done())
    }
}
