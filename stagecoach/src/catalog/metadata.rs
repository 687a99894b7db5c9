// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Metadata collaborator trait definition
//!
//! The coordinator never stores catalog state itself. Every structural
//! mutation requested by a data-definition task goes through exactly one call
//! on this trait, and the implementation is responsible for making that call
//! atomic and safe under concurrent use.

use super::error::MetadataResult;
use crate::ast::{Expression, Privilege};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Fully resolved `catalog.schema`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogSchemaName {
    pub catalog: String,
    pub schema: String,
}

impl CatalogSchemaName {
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
        }
    }
}

impl fmt::Display for CatalogSchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.catalog, self.schema)
    }
}

/// Fully resolved `catalog.schema.object`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedObjectName {
    pub catalog: String,
    pub schema: String,
    pub object_name: String,
}

impl QualifiedObjectName {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        object_name: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            object_name: object_name.into(),
        }
    }

    pub fn schema_name(&self) -> CatalogSchemaName {
        CatalogSchemaName::new(self.catalog.clone(), self.schema.clone())
    }
}

impl fmt::Display for QualifiedObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.object_name)
    }
}

/// Column of a table definition handed to the metadata collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: QualifiedObjectName,
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Column lookup ignoring case
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }
}

/// Catalog and structural metadata operations
///
/// Create operations fail with an "already exists" error when the target
/// exists, and drop operations fail with a "not found" error when it does
/// not. Callers do not catch or retry these.
pub trait Metadata: Send + Sync {
    fn catalog_exists(&self, session: &Session, catalog: &str) -> bool;

    fn schema_exists(&self, session: &Session, schema: &CatalogSchemaName) -> bool;

    fn create_schema(&self, session: &Session, schema: &CatalogSchemaName) -> MetadataResult<()>;

    fn drop_schema(
        &self,
        session: &Session,
        schema: &CatalogSchemaName,
        cascade: bool,
    ) -> MetadataResult<()>;

    /// Rename within the same catalog
    fn rename_schema(
        &self,
        session: &Session,
        source: &CatalogSchemaName,
        target: &str,
    ) -> MetadataResult<()>;

    fn table_exists(&self, session: &Session, table: &QualifiedObjectName) -> bool;

    fn create_table(
        &self,
        session: &Session,
        table: &TableMetadata,
        ignore_existing: bool,
    ) -> MetadataResult<()>;

    fn drop_table(&self, session: &Session, table: &QualifiedObjectName) -> MetadataResult<()>;

    fn get_table(&self, session: &Session, table: &QualifiedObjectName) -> Option<TableMetadata>;

    fn rename_table(
        &self,
        session: &Session,
        source: &QualifiedObjectName,
        target: &QualifiedObjectName,
    ) -> MetadataResult<()>;

    fn add_column(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        column: &ColumnMetadata,
    ) -> MetadataResult<()>;

    fn rename_column(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        source: &str,
        target: &str,
    ) -> MetadataResult<()>;

    fn drop_column(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        column: &str,
    ) -> MetadataResult<()>;

    fn view_exists(&self, session: &Session, view: &QualifiedObjectName) -> bool;

    fn create_view(
        &self,
        session: &Session,
        view: &QualifiedObjectName,
        view_sql: &str,
        replace: bool,
    ) -> MetadataResult<()>;

    fn drop_view(&self, session: &Session, view: &QualifiedObjectName) -> MetadataResult<()>;

    fn create_model(&self, session: &Session, catalog: &str, model: &str) -> MetadataResult<()>;

    fn drop_model(&self, session: &Session, catalog: &str, model: &str) -> MetadataResult<()>;

    /// `(catalog, model)` pairs, optionally restricted to one catalog
    fn list_models(&self, session: &Session, catalog: Option<&str>) -> Vec<(String, String)>;

    fn grant_table_privileges(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        privileges: &BTreeSet<Privilege>,
        grantee: &str,
        grant_option: bool,
    ) -> MetadataResult<()>;

    fn revoke_table_privileges(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        privileges: &BTreeSet<Privilege>,
        grantee: &str,
        grant_option: bool,
    ) -> MetadataResult<()>;

    /// Invoke a registered procedure with literal arguments
    fn call_procedure(
        &self,
        session: &Session,
        procedure: &QualifiedObjectName,
        arguments: &[Expression],
    ) -> MetadataResult<()>;
}
