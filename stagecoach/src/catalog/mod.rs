// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog collaborators: metadata mutations and access control
//!
//! The coordinator treats both as external services. `InMemoryMetadata`,
//! `AllowAllAccessControl` and `ReadOnlyAccessControl` are reference
//! implementations for embedding and tests.

pub mod access_control;
pub mod error;
pub mod memory;
pub mod metadata;

pub use access_control::{
    AccessControl, AccessDeniedError, AccessResult, AllowAllAccessControl, ReadOnlyAccessControl,
};
pub use error::{MetadataError, MetadataResult};
pub use memory::{InMemoryMetadata, Procedure};
pub use metadata::{
    CatalogSchemaName, ColumnMetadata, Metadata, QualifiedObjectName, TableMetadata,
};
