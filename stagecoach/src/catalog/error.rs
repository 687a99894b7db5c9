// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types raised by the metadata collaborator

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Catalog not found: {0}")]
    CatalogNotFound(String),

    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Schema already exists: {0}")]
    SchemaAlreadyExists(String),

    #[error("Schema not empty: {0}")]
    SchemaNotEmpty(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error("View already exists: {0}")]
    ViewAlreadyExists(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Model already exists: {0}")]
    ModelAlreadyExists(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column already exists: {0}")]
    ColumnAlreadyExists(String),

    #[error("Procedure not registered: {0}")]
    ProcedureNotFound(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Metadata operation failed: {0}")]
    OperationFailed(String),
}

impl MetadataError {
    /// Conflicts are correct rejections of a request, not faults
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            MetadataError::SchemaAlreadyExists(_)
                | MetadataError::TableAlreadyExists(_)
                | MetadataError::ViewAlreadyExists(_)
                | MetadataError::ModelAlreadyExists(_)
                | MetadataError::ColumnAlreadyExists(_)
                | MetadataError::SchemaNotFound(_)
                | MetadataError::TableNotFound(_)
                | MetadataError::ViewNotFound(_)
                | MetadataError::ModelNotFound(_)
                | MetadataError::ColumnNotFound(_)
        )
    }
}

pub type MetadataResult<T> = Result<T, MetadataError>;
