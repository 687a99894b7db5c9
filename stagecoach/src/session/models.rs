// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session models
//!
//! A [`Session`] is an immutable snapshot of the client context a statement
//! runs under. Statements that change the context return [`SessionUpdate`]s
//! and the client applies them with [`Session::with_updates`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::properties::{EXECUTION_POLICY, QUERY_MAX_MEMORY};
use crate::memory::DataSize;
use crate::txn::TransactionId;

/// Authenticated principal a session acts for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user: String,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

/// Change to the client context produced by a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionUpdate {
    SetCatalog(String),
    SetSchema(String),
    SetSystemProperty { name: String, value: String },
    ResetSystemProperty(String),
    SetCatalogProperty { catalog: String, name: String, value: String },
    ResetCatalogProperty { catalog: String, name: String },
    StartedTransaction(TransactionId),
    ClearTransaction,
    AddPreparedStatement { name: String, sql: String },
    DeallocatePreparedStatement(String),
    /// Function resolution path as `catalog.schema` elements
    SetPath(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub identity: Identity,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub transaction_id: Option<TransactionId>,
    pub system_properties: BTreeMap<String, String>,
    /// Keyed by catalog name, then property name
    pub catalog_properties: BTreeMap<String, BTreeMap<String, String>>,
    /// Prepared statement name to SQL text
    pub prepared_statements: BTreeMap<String, String>,
    /// Schemas searched for unqualified functions, in order
    pub path: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    pub fn builder(user: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(user)
    }

    pub fn user(&self) -> &str {
        &self.identity.user
    }

    pub fn system_property(&self, name: &str) -> Option<&str> {
        self.system_properties.get(name).map(String::as_str)
    }

    pub fn catalog_property(&self, catalog: &str, name: &str) -> Option<&str> {
        self.catalog_properties
            .get(catalog)
            .and_then(|properties| properties.get(name))
            .map(String::as_str)
    }

    pub fn prepared_statement(&self, name: &str) -> Option<&str> {
        self.prepared_statements.get(name).map(String::as_str)
    }

    /// Per-query memory limit requested by the client, if any
    pub fn query_max_memory(&self) -> Result<Option<DataSize>, String> {
        self.system_property(QUERY_MAX_MEMORY)
            .map(str::parse::<DataSize>)
            .transpose()
    }

    pub fn execution_policy(&self) -> Option<&str> {
        self.system_property(EXECUTION_POLICY)
    }

    /// Return a new session with `updates` applied in order
    pub fn with_updates(&self, updates: &[SessionUpdate]) -> Session {
        let mut session = self.clone();
        for update in updates {
            match update {
                SessionUpdate::SetCatalog(catalog) => session.catalog = Some(catalog.clone()),
                SessionUpdate::SetSchema(schema) => session.schema = Some(schema.clone()),
                SessionUpdate::SetSystemProperty { name, value } => {
                    session.system_properties.insert(name.clone(), value.clone());
                }
                SessionUpdate::ResetSystemProperty(name) => {
                    session.system_properties.remove(name);
                }
                SessionUpdate::SetCatalogProperty {
                    catalog,
                    name,
                    value,
                } => {
                    session
                        .catalog_properties
                        .entry(catalog.clone())
                        .or_default()
                        .insert(name.clone(), value.clone());
                }
                SessionUpdate::ResetCatalogProperty { catalog, name } => {
                    if let Some(properties) = session.catalog_properties.get_mut(catalog) {
                        properties.remove(name);
                        if properties.is_empty() {
                            session.catalog_properties.remove(catalog);
                        }
                    }
                }
                SessionUpdate::StartedTransaction(id) => session.transaction_id = Some(*id),
                SessionUpdate::ClearTransaction => session.transaction_id = None,
                SessionUpdate::AddPreparedStatement { name, sql } => {
                    session.prepared_statements.insert(name.clone(), sql.clone());
                }
                SessionUpdate::DeallocatePreparedStatement(name) => {
                    session.prepared_statements.remove(name);
                }
                SessionUpdate::SetPath(path) => session.path = path.clone(),
            }
        }
        session
    }
}

/// Builder for [`Session`]
pub struct SessionBuilder {
    identity: Identity,
    catalog: Option<String>,
    schema: Option<String>,
    transaction_id: Option<TransactionId>,
    system_properties: BTreeMap<String, String>,
}

impl SessionBuilder {
    fn new(user: impl Into<String>) -> Self {
        Self {
            identity: Identity::new(user),
            catalog: None,
            schema: None,
            transaction_id: None,
            system_properties: BTreeMap::new(),
        }
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn transaction_id(mut self, id: TransactionId) -> Self {
        self.transaction_id = Some(id);
        self
    }

    pub fn system_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.system_properties.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Session {
        Session {
            session_id: uuid::Uuid::new_v4().to_string(),
            identity: self.identity,
            catalog: self.catalog,
            schema: self.schema,
            transaction_id: self.transaction_id,
            system_properties: self.system_properties,
            catalog_properties: BTreeMap::new(),
            prepared_statements: BTreeMap::new(),
            path: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_updates_leaves_original_untouched() {
        let session = Session::builder("alice").catalog("hive").build();
        let updated = session.with_updates(&[
            SessionUpdate::SetSchema("web".to_string()),
            SessionUpdate::SetSystemProperty {
                name: QUERY_MAX_MEMORY.to_string(),
                value: "1GB".to_string(),
            },
            SessionUpdate::AddPreparedStatement {
                name: "q1".to_string(),
                sql: "SELECT 1".to_string(),
            },
        ]);

        assert_eq!(session.schema, None);
        assert_eq!(updated.schema.as_deref(), Some("web"));
        assert_eq!(updated.session_id, session.session_id);
        assert_eq!(updated.query_max_memory(), Ok(Some(DataSize::gigabytes(1))));
        assert_eq!(updated.prepared_statement("q1"), Some("SELECT 1"));

        let reset = updated.with_updates(&[
            SessionUpdate::ResetSystemProperty(QUERY_MAX_MEMORY.to_string()),
            SessionUpdate::DeallocatePreparedStatement("q1".to_string()),
        ]);
        assert_eq!(reset.query_max_memory(), Ok(None));
        assert!(reset.prepared_statements.is_empty());
    }

    #[test]
    fn test_transaction_updates() {
        let session = Session::builder("alice").build();
        let id = TransactionId::new();
        let in_txn = session.with_updates(&[SessionUpdate::StartedTransaction(id)]);
        assert_eq!(in_txn.transaction_id, Some(id));
        let done = in_txn.with_updates(&[SessionUpdate::ClearTransaction]);
        assert_eq!(done.transaction_id, None);
    }

    #[test]
    fn test_catalog_properties() {
        let session = Session::builder("alice").build().with_updates(&[
            SessionUpdate::SetCatalogProperty {
                catalog: "hive".to_string(),
                name: "bucket_execution".to_string(),
                value: "true".to_string(),
            },
        ]);
        assert_eq!(session.catalog_property("hive", "bucket_execution"), Some("true"));

        let reset = session.with_updates(&[SessionUpdate::ResetCatalogProperty {
            catalog: "hive".to_string(),
            name: "bucket_execution".to_string(),
        }]);
        assert!(reset.catalog_properties.is_empty());
    }
}
