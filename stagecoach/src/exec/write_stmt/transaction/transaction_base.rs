// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::Statement;
use crate::exec::error::SemanticErrorCode;
use crate::exec::write_stmt::statement_base::DdlContext;
use crate::exec::ExecutionError;
use crate::txn::TransactionId;

/// The explicit transaction of the session, required by COMMIT and ROLLBACK
pub fn session_transaction(
    statement: &Statement,
    context: &DdlContext<'_>,
) -> Result<TransactionId, ExecutionError> {
    context.session.transaction_id.ok_or_else(|| {
        ExecutionError::semantic(
            SemanticErrorCode::InvalidTransactionState,
            statement,
            "No transaction in progress",
        )
    })
}
