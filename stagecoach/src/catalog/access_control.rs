// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Access control collaborator
//!
//! Data-definition tasks consult the access control before any metadata
//! mutation. A denial means nothing has been changed.

use super::metadata::{CatalogSchemaName, QualifiedObjectName};
use crate::ast::Privilege;
use crate::session::Identity;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Access Denied: {0}")]
pub struct AccessDeniedError(pub String);

impl AccessDeniedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type AccessResult = Result<(), AccessDeniedError>;

/// Authorization checks performed ahead of data-definition mutations
pub trait AccessControl: Send + Sync {
    fn check_can_create_schema(&self, identity: &Identity, schema: &CatalogSchemaName)
        -> AccessResult;

    fn check_can_drop_schema(&self, identity: &Identity, schema: &CatalogSchemaName)
        -> AccessResult;

    fn check_can_rename_schema(
        &self,
        identity: &Identity,
        schema: &CatalogSchemaName,
        new_name: &str,
    ) -> AccessResult;

    fn check_can_create_table(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult;

    fn check_can_drop_table(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult;

    fn check_can_rename_table(
        &self,
        identity: &Identity,
        table: &QualifiedObjectName,
        new_table: &QualifiedObjectName,
    ) -> AccessResult;

    fn check_can_add_column(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult;

    fn check_can_rename_column(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult;

    fn check_can_drop_column(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult;

    fn check_can_create_view(&self, identity: &Identity, view: &QualifiedObjectName)
        -> AccessResult;

    fn check_can_drop_view(&self, identity: &Identity, view: &QualifiedObjectName) -> AccessResult;

    fn check_can_create_model(&self, identity: &Identity, catalog: &str, model: &str)
        -> AccessResult;

    fn check_can_drop_model(&self, identity: &Identity, catalog: &str, model: &str)
        -> AccessResult;

    fn check_can_set_system_session_property(
        &self,
        identity: &Identity,
        property: &str,
    ) -> AccessResult;

    fn check_can_set_catalog_session_property(
        &self,
        identity: &Identity,
        catalog: &str,
        property: &str,
    ) -> AccessResult;

    fn check_can_grant_table_privileges(
        &self,
        identity: &Identity,
        table: &QualifiedObjectName,
        privileges: &BTreeSet<Privilege>,
        grantee: &str,
    ) -> AccessResult;

    fn check_can_revoke_table_privileges(
        &self,
        identity: &Identity,
        table: &QualifiedObjectName,
        privileges: &BTreeSet<Privilege>,
        grantee: &str,
    ) -> AccessResult;
}

/// Allows every operation
#[derive(Debug, Default, Clone)]
pub struct AllowAllAccessControl;

impl AccessControl for AllowAllAccessControl {
    fn check_can_create_schema(&self, _: &Identity, _: &CatalogSchemaName) -> AccessResult {
        Ok(())
    }

    fn check_can_drop_schema(&self, _: &Identity, _: &CatalogSchemaName) -> AccessResult {
        Ok(())
    }

    fn check_can_rename_schema(
        &self,
        _: &Identity,
        _: &CatalogSchemaName,
        _: &str,
    ) -> AccessResult {
        Ok(())
    }

    fn check_can_create_table(&self, _: &Identity, _: &QualifiedObjectName) -> AccessResult {
        Ok(())
    }

    fn check_can_drop_table(&self, _: &Identity, _: &QualifiedObjectName) -> AccessResult {
        Ok(())
    }

    fn check_can_rename_table(
        &self,
        _: &Identity,
        _: &QualifiedObjectName,
        _: &QualifiedObjectName,
    ) -> AccessResult {
        Ok(())
    }

    fn check_can_add_column(&self, _: &Identity, _: &QualifiedObjectName) -> AccessResult {
        Ok(())
    }

    fn check_can_rename_column(&self, _: &Identity, _: &QualifiedObjectName) -> AccessResult {
        Ok(())
    }

    fn check_can_drop_column(&self, _: &Identity, _: &QualifiedObjectName) -> AccessResult {
        Ok(())
    }

    fn check_can_create_view(&self, _: &Identity, _: &QualifiedObjectName) -> AccessResult {
        Ok(())
    }

    fn check_can_drop_view(&self, _: &Identity, _: &QualifiedObjectName) -> AccessResult {
        Ok(())
    }

    fn check_can_create_model(&self, _: &Identity, _: &str, _: &str) -> AccessResult {
        Ok(())
    }

    fn check_can_drop_model(&self, _: &Identity, _: &str, _: &str) -> AccessResult {
        Ok(())
    }

    fn check_can_set_system_session_property(&self, _: &Identity, _: &str) -> AccessResult {
        Ok(())
    }

    fn check_can_set_catalog_session_property(
        &self,
        _: &Identity,
        _: &str,
        _: &str,
    ) -> AccessResult {
        Ok(())
    }

    fn check_can_grant_table_privileges(
        &self,
        _: &Identity,
        _: &QualifiedObjectName,
        _: &BTreeSet<Privilege>,
        _: &str,
    ) -> AccessResult {
        Ok(())
    }

    fn check_can_revoke_table_privileges(
        &self,
        _: &Identity,
        _: &QualifiedObjectName,
        _: &BTreeSet<Privilege>,
        _: &str,
    ) -> AccessResult {
        Ok(())
    }
}

/// Read-only access control: only the listed users may run mutations
#[derive(Debug, Default, Clone)]
pub struct ReadOnlyAccessControl {
    writers: HashSet<String>,
}

impl ReadOnlyAccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer(mut self, user: impl Into<String>) -> Self {
        self.writers.insert(user.into());
        self
    }

    fn check_writer(&self, identity: &Identity, action: &str) -> AccessResult {
        if self.writers.contains(&identity.user) {
            Ok(())
        } else {
            Err(AccessDeniedError::new(format!(
                "User {} cannot {}",
                identity.user, action
            )))
        }
    }
}

impl AccessControl for ReadOnlyAccessControl {
    fn check_can_create_schema(&self, identity: &Identity, schema: &CatalogSchemaName)
        -> AccessResult {
        self.check_writer(identity, &format!("create schema {}", schema))
    }

    fn check_can_drop_schema(&self, identity: &Identity, schema: &CatalogSchemaName)
        -> AccessResult {
        self.check_writer(identity, &format!("drop schema {}", schema))
    }

    fn check_can_rename_schema(
        &self,
        identity: &Identity,
        schema: &CatalogSchemaName,
        new_name: &str,
    ) -> AccessResult {
        self.check_writer(identity, &format!("rename schema {} to {}", schema, new_name))
    }

    fn check_can_create_table(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult {
        self.check_writer(identity, &format!("create table {}", table))
    }

    fn check_can_drop_table(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult {
        self.check_writer(identity, &format!("drop table {}", table))
    }

    fn check_can_rename_table(
        &self,
        identity: &Identity,
        table: &QualifiedObjectName,
        new_table: &QualifiedObjectName,
    ) -> AccessResult {
        self.check_writer(identity, &format!("rename table {} to {}", table, new_table))
    }

    fn check_can_add_column(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult {
        self.check_writer(identity, &format!("add a column to table {}", table))
    }

    fn check_can_rename_column(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult {
        self.check_writer(identity, &format!("rename a column in table {}", table))
    }

    fn check_can_drop_column(&self, identity: &Identity, table: &QualifiedObjectName)
        -> AccessResult {
        self.check_writer(identity, &format!("drop a column from table {}", table))
    }

    fn check_can_create_view(&self, identity: &Identity, view: &QualifiedObjectName)
        -> AccessResult {
        self.check_writer(identity, &format!("create view {}", view))
    }

    fn check_can_drop_view(&self, identity: &Identity, view: &QualifiedObjectName) -> AccessResult {
        self.check_writer(identity, &format!("drop view {}", view))
    }

    fn check_can_create_model(&self, identity: &Identity, catalog: &str, model: &str)
        -> AccessResult {
        self.check_writer(identity, &format!("create model {}.{}", catalog, model))
    }

    fn check_can_drop_model(&self, identity: &Identity, catalog: &str, model: &str)
        -> AccessResult {
        self.check_writer(identity, &format!("drop model {}.{}", catalog, model))
    }

    fn check_can_set_system_session_property(&self, _: &Identity, _: &str) -> AccessResult {
        Ok(())
    }

    fn check_can_set_catalog_session_property(
        &self,
        _: &Identity,
        _: &str,
        _: &str,
    ) -> AccessResult {
        Ok(())
    }

    fn check_can_grant_table_privileges(
        &self,
        identity: &Identity,
        table: &QualifiedObjectName,
        _: &BTreeSet<Privilege>,
        grantee: &str,
    ) -> AccessResult {
        self.check_writer(identity, &format!("grant privileges on {} to {}", table, grantee))
    }

    fn check_can_revoke_table_privileges(
        &self,
        identity: &Identity,
        table: &QualifiedObjectName,
        _: &BTreeSet<Privilege>,
        grantee: &str,
    ) -> AccessResult {
        self.check_writer(
            identity,
            &format!("revoke privileges on {} from {}", table, grantee),
        )
    }
}
