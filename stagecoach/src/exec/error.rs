// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::Statement;
use crate::catalog::{AccessDeniedError, MetadataError};
use crate::coordinator::QueryId;
use crate::memory::DataSize;
use crate::txn::TransactionError;

/// Classification of semantic failures detected before any side effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticErrorCode {
    InvalidName,
    InvalidModelName,
    MissingCatalog,
    MissingSchema,
    CatalogNotFound,
    DuplicateColumnName,
    MissingColumn,
    ColumnAlreadyExists,
    InvalidSessionProperty,
    InvalidParameter,
    InvalidTransactionState,
    PreparedStatementNotFound,
    InvalidExecutionPolicy,
    NotSupported,
}

/// Coarse failure category reported with a failed query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    UserError,
    InsufficientResources,
    External,
    Internal,
}

/// Execution errors
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error("{message}")]
    Semantic {
        code: SemanticErrorCode,
        statement: Box<Statement>,
        message: String,
    },

    #[error(transparent)]
    AccessDenied(#[from] AccessDeniedError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("Planning error: {0}")]
    Planning(String),

    #[error("Scheduling error: {0}")]
    Scheduling(String),

    #[error("Query not found: {0}")]
    QueryNotFound(QueryId),

    #[error("Query was canceled: {0}")]
    Canceled(String),

    #[error("Query exceeded distributed user memory limit of {limit} (reserved {reserved})")]
    ExceededMemoryLimit { limit: DataSize, reserved: DataSize },

    #[error("Query killed because the cluster is out of memory. Please try again in a few minutes.")]
    ClusterOutOfMemory,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExecutionError {
    pub fn semantic(
        code: SemanticErrorCode,
        statement: &Statement,
        message: impl Into<String>,
    ) -> Self {
        ExecutionError::Semantic {
            code,
            statement: Box::new(statement.clone()),
            message: message.into(),
        }
    }

    pub fn semantic_code(&self) -> Option<SemanticErrorCode> {
        match self {
            ExecutionError::Semantic { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            ExecutionError::Semantic { .. }
            | ExecutionError::AccessDenied(_)
            | ExecutionError::Metadata(_)
            | ExecutionError::Transaction(_)
            | ExecutionError::QueryNotFound(_)
            | ExecutionError::Canceled(_) => ErrorType::UserError,
            ExecutionError::ExceededMemoryLimit { .. } | ExecutionError::ClusterOutOfMemory => {
                ErrorType::InsufficientResources
            }
            ExecutionError::Planning(_) | ExecutionError::Scheduling(_) => ErrorType::External,
            ExecutionError::Internal(_) => ErrorType::Internal,
        }
    }

    /// Expected conflicts are reported to the client but kept out of the error log
    pub fn is_expected_conflict(&self) -> bool {
        matches!(self, ExecutionError::Metadata(e) if e.is_conflict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{QualifiedName, CreateModelStatement, Location};

    #[test]
    fn test_metadata_errors_are_not_rewrapped() {
        let cause = MetadataError::ModelAlreadyExists("catalog1.model1".to_string());
        let error: ExecutionError = cause.clone().into();
        assert_eq!(error.to_string(), cause.to_string());
        assert!(error.is_expected_conflict());
        assert_eq!(error.error_type(), ErrorType::UserError);
    }

    #[test]
    fn test_semantic_error_carries_statement() {
        let statement = Statement::CreateModel(CreateModelStatement {
            model_name: QualifiedName::parse("model1"),
            location: Location::default(),
        });
        let error = ExecutionError::semantic(
            SemanticErrorCode::InvalidName,
            &statement,
            "Too many parts in schema name",
        );
        assert_eq!(error.to_string(), "Too many parts in schema name");
        assert_eq!(error.semantic_code(), Some(SemanticErrorCode::InvalidName));
        match error {
            ExecutionError::Semantic { statement: s, .. } => assert_eq!(*s, statement),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
