// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory metadata implementation
//!
//! Holds catalogs, schemas, tables, views, models and table grants in a
//! single lock. Every trait call takes the lock once, so each mutation is
//! atomic with respect to concurrent callers.

use super::error::{MetadataError, MetadataResult};
use super::metadata::{
    CatalogSchemaName, ColumnMetadata, Metadata, QualifiedObjectName, TableMetadata,
};
use crate::ast::{Expression, Privilege};
use crate::session::Session;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// Body of a procedure invoked by CALL
pub type Procedure = Arc<dyn Fn(&Session, &[Expression]) -> MetadataResult<()> + Send + Sync>;

#[derive(Debug, Default)]
struct SchemaEntry {
    tables: BTreeMap<String, TableMetadata>,
    views: BTreeMap<String, String>,
}

impl SchemaEntry {
    fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.views.is_empty()
    }
}

#[derive(Debug, Default)]
struct CatalogEntry {
    schemas: BTreeMap<String, SchemaEntry>,
    models: BTreeSet<String>,
}

/// Grant key: table, grantee
type GrantKey = (QualifiedObjectName, String);

#[derive(Debug, Default)]
struct MetadataState {
    catalogs: BTreeMap<String, CatalogEntry>,
    grants: HashMap<GrantKey, BTreeMap<Privilege, bool>>,
}

/// Metadata backed by process memory
#[derive(Default)]
pub struct InMemoryMetadata {
    state: RwLock<MetadataState>,
    procedures: RwLock<BTreeMap<QualifiedObjectName, Procedure>>,
}

impl fmt::Debug for InMemoryMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryMetadata")
            .field("state", &self.state)
            .field("procedures", &self.procedures.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl InMemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metadata pre-populated with empty catalogs
    pub fn with_catalogs<I, S>(catalogs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let metadata = Self::new();
        {
            let mut state = metadata.state.write();
            for catalog in catalogs {
                state.catalogs.insert(catalog.into(), CatalogEntry::default());
            }
        }
        metadata
    }

    pub fn add_catalog(&self, catalog: impl Into<String>) {
        self.state
            .write()
            .catalogs
            .entry(catalog.into())
            .or_default();
    }

    /// Privileges currently granted on a table, with their grant option flag
    pub fn table_grants(
        &self,
        table: &QualifiedObjectName,
        grantee: &str,
    ) -> BTreeMap<Privilege, bool> {
        self.state
            .read()
            .grants
            .get(&(table.clone(), grantee.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Make `procedure` callable under `name`, replacing any previous body
    pub fn register_procedure(&self, name: QualifiedObjectName, procedure: Procedure) {
        self.procedures.write().insert(name, procedure);
    }

    pub fn view_definition(&self, view: &QualifiedObjectName) -> Option<String> {
        let state = self.state.read();
        state
            .catalogs
            .get(&view.catalog)?
            .schemas
            .get(&view.schema)?
            .views
            .get(&view.object_name)
            .cloned()
    }
}

fn catalog_mut<'a>(
    state: &'a mut MetadataState,
    catalog: &str,
) -> MetadataResult<&'a mut CatalogEntry> {
    state
        .catalogs
        .get_mut(catalog)
        .ok_or_else(|| MetadataError::CatalogNotFound(catalog.to_string()))
}

fn schema_mut<'a>(
    state: &'a mut MetadataState,
    schema: &CatalogSchemaName,
) -> MetadataResult<&'a mut SchemaEntry> {
    catalog_mut(state, &schema.catalog)?
        .schemas
        .get_mut(&schema.schema)
        .ok_or_else(|| MetadataError::SchemaNotFound(schema.to_string()))
}

fn table_mut<'a>(
    state: &'a mut MetadataState,
    table: &QualifiedObjectName,
) -> MetadataResult<&'a mut TableMetadata> {
    schema_mut(state, &table.schema_name())?
        .tables
        .get_mut(&table.object_name)
        .ok_or_else(|| MetadataError::TableNotFound(table.to_string()))
}

fn column_position(table: &TableMetadata, column: &str) -> MetadataResult<usize> {
    table
        .columns
        .iter()
        .position(|existing| existing.name.eq_ignore_ascii_case(column))
        .ok_or_else(|| MetadataError::ColumnNotFound(format!("{}.{}", table.name, column)))
}

impl Metadata for InMemoryMetadata {
    fn catalog_exists(&self, _session: &Session, catalog: &str) -> bool {
        self.state.read().catalogs.contains_key(catalog)
    }

    fn schema_exists(&self, _session: &Session, schema: &CatalogSchemaName) -> bool {
        self.state
            .read()
            .catalogs
            .get(&schema.catalog)
            .map_or(false, |catalog| catalog.schemas.contains_key(&schema.schema))
    }

    fn create_schema(&self, _session: &Session, schema: &CatalogSchemaName) -> MetadataResult<()> {
        let mut state = self.state.write();
        let catalog = catalog_mut(&mut state, &schema.catalog)?;
        if catalog.schemas.contains_key(&schema.schema) {
            return Err(MetadataError::SchemaAlreadyExists(schema.to_string()));
        }
        catalog
            .schemas
            .insert(schema.schema.clone(), SchemaEntry::default());
        Ok(())
    }

    fn drop_schema(
        &self,
        _session: &Session,
        schema: &CatalogSchemaName,
        cascade: bool,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let catalog = catalog_mut(&mut state, &schema.catalog)?;
        let entry = catalog
            .schemas
            .get(&schema.schema)
            .ok_or_else(|| MetadataError::SchemaNotFound(schema.to_string()))?;
        if !cascade && !entry.is_empty() {
            return Err(MetadataError::SchemaNotEmpty(schema.to_string()));
        }
        catalog.schemas.remove(&schema.schema);
        state.grants.retain(|(table, _), _| {
            table.catalog != schema.catalog || table.schema != schema.schema
        });
        Ok(())
    }

    fn rename_schema(
        &self,
        _session: &Session,
        source: &CatalogSchemaName,
        target: &str,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let catalog = catalog_mut(&mut state, &source.catalog)?;
        if catalog.schemas.contains_key(target) {
            return Err(MetadataError::SchemaAlreadyExists(format!(
                "{}.{}",
                source.catalog, target
            )));
        }
        let Some(mut entry) = catalog.schemas.remove(&source.schema) else {
            return Err(MetadataError::SchemaNotFound(source.to_string()));
        };
        for table in entry.tables.values_mut() {
            table.name.schema = target.to_string();
        }
        catalog.schemas.insert(target.to_string(), entry);

        let grants = std::mem::take(&mut state.grants);
        state.grants = grants
            .into_iter()
            .map(|((mut table, grantee), privileges)| {
                if table.catalog == source.catalog && table.schema == source.schema {
                    table.schema = target.to_string();
                }
                ((table, grantee), privileges)
            })
            .collect();
        Ok(())
    }

    fn table_exists(&self, _session: &Session, table: &QualifiedObjectName) -> bool {
        let state = self.state.read();
        state
            .catalogs
            .get(&table.catalog)
            .and_then(|catalog| catalog.schemas.get(&table.schema))
            .map_or(false, |schema| schema.tables.contains_key(&table.object_name))
    }

    fn create_table(
        &self,
        _session: &Session,
        table: &TableMetadata,
        ignore_existing: bool,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let schema = schema_mut(&mut state, &table.name.schema_name())?;
        if schema.tables.contains_key(&table.name.object_name)
            || schema.views.contains_key(&table.name.object_name)
        {
            if ignore_existing {
                return Ok(());
            }
            return Err(MetadataError::TableAlreadyExists(table.name.to_string()));
        }
        schema
            .tables
            .insert(table.name.object_name.clone(), table.clone());
        Ok(())
    }

    fn drop_table(&self, _session: &Session, table: &QualifiedObjectName) -> MetadataResult<()> {
        let mut state = self.state.write();
        let schema = schema_mut(&mut state, &table.schema_name())?;
        if schema.tables.remove(&table.object_name).is_none() {
            return Err(MetadataError::TableNotFound(table.to_string()));
        }
        state.grants.retain(|(granted, _), _| granted != table);
        Ok(())
    }

    fn get_table(&self, _session: &Session, table: &QualifiedObjectName) -> Option<TableMetadata> {
        let state = self.state.read();
        state
            .catalogs
            .get(&table.catalog)?
            .schemas
            .get(&table.schema)?
            .tables
            .get(&table.object_name)
            .cloned()
    }

    fn rename_table(
        &self,
        _session: &Session,
        source: &QualifiedObjectName,
        target: &QualifiedObjectName,
    ) -> MetadataResult<()> {
        if source.catalog != target.catalog {
            return Err(MetadataError::NotSupported(
                "Table rename across catalogs is not supported".to_string(),
            ));
        }
        let mut state = self.state.write();
        {
            let target_schema = schema_mut(&mut state, &target.schema_name())?;
            if target_schema.tables.contains_key(&target.object_name)
                || target_schema.views.contains_key(&target.object_name)
            {
                return Err(MetadataError::TableAlreadyExists(target.to_string()));
            }
        }
        let mut table = schema_mut(&mut state, &source.schema_name())?
            .tables
            .remove(&source.object_name)
            .ok_or_else(|| MetadataError::TableNotFound(source.to_string()))?;
        table.name = target.clone();
        schema_mut(&mut state, &target.schema_name())?
            .tables
            .insert(target.object_name.clone(), table);

        let moved: Vec<GrantKey> = state
            .grants
            .keys()
            .filter(|(table, _)| table == source)
            .cloned()
            .collect();
        for key in moved {
            if let Some(privileges) = state.grants.remove(&key) {
                state.grants.insert((target.clone(), key.1), privileges);
            }
        }
        Ok(())
    }

    fn add_column(
        &self,
        _session: &Session,
        table: &QualifiedObjectName,
        column: &ColumnMetadata,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let entry = table_mut(&mut state, table)?;
        if entry.column(&column.name).is_some() {
            return Err(MetadataError::ColumnAlreadyExists(format!(
                "{}.{}",
                table, column.name
            )));
        }
        entry.columns.push(column.clone());
        Ok(())
    }

    fn rename_column(
        &self,
        _session: &Session,
        table: &QualifiedObjectName,
        source: &str,
        target: &str,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let entry = table_mut(&mut state, table)?;
        let position = column_position(entry, source)?;
        if entry.column(target).is_some() {
            return Err(MetadataError::ColumnAlreadyExists(format!("{}.{}", table, target)));
        }
        entry.columns[position].name = target.to_string();
        Ok(())
    }

    fn drop_column(
        &self,
        _session: &Session,
        table: &QualifiedObjectName,
        column: &str,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let entry = table_mut(&mut state, table)?;
        let position = column_position(entry, column)?;
        if entry.columns.len() == 1 {
            return Err(MetadataError::NotSupported(
                "Cannot drop the only column in a table".to_string(),
            ));
        }
        entry.columns.remove(position);
        Ok(())
    }

    fn view_exists(&self, _session: &Session, view: &QualifiedObjectName) -> bool {
        self.view_definition(view).is_some()
    }

    fn create_view(
        &self,
        _session: &Session,
        view: &QualifiedObjectName,
        view_sql: &str,
        replace: bool,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let schema = schema_mut(&mut state, &view.schema_name())?;
        if schema.tables.contains_key(&view.object_name) {
            return Err(MetadataError::TableAlreadyExists(view.to_string()));
        }
        if schema.views.contains_key(&view.object_name) && !replace {
            return Err(MetadataError::ViewAlreadyExists(view.to_string()));
        }
        schema
            .views
            .insert(view.object_name.clone(), view_sql.to_string());
        Ok(())
    }

    fn drop_view(&self, _session: &Session, view: &QualifiedObjectName) -> MetadataResult<()> {
        let mut state = self.state.write();
        let schema = schema_mut(&mut state, &view.schema_name())?;
        if schema.views.remove(&view.object_name).is_none() {
            return Err(MetadataError::ViewNotFound(view.to_string()));
        }
        Ok(())
    }

    fn create_model(&self, _session: &Session, catalog: &str, model: &str) -> MetadataResult<()> {
        let mut state = self.state.write();
        let entry = catalog_mut(&mut state, catalog)?;
        if !entry.models.insert(model.to_string()) {
            return Err(MetadataError::ModelAlreadyExists(format!(
                "{}.{}",
                catalog, model
            )));
        }
        Ok(())
    }

    fn drop_model(&self, _session: &Session, catalog: &str, model: &str) -> MetadataResult<()> {
        let mut state = self.state.write();
        let entry = catalog_mut(&mut state, catalog)?;
        if !entry.models.remove(model) {
            return Err(MetadataError::ModelNotFound(format!("{}.{}", catalog, model)));
        }
        Ok(())
    }

    fn list_models(&self, _session: &Session, catalog: Option<&str>) -> Vec<(String, String)> {
        let state = self.state.read();
        state
            .catalogs
            .iter()
            .filter(|(name, _)| catalog.map_or(true, |wanted| wanted == name.as_str()))
            .flat_map(|(name, entry)| {
                entry
                    .models
                    .iter()
                    .map(move |model| (name.clone(), model.clone()))
            })
            .collect()
    }

    fn grant_table_privileges(
        &self,
        _session: &Session,
        table: &QualifiedObjectName,
        privileges: &BTreeSet<Privilege>,
        grantee: &str,
        grant_option: bool,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let exists = schema_mut(&mut state, &table.schema_name())?
            .tables
            .contains_key(&table.object_name);
        if !exists {
            return Err(MetadataError::TableNotFound(table.to_string()));
        }
        let granted = state
            .grants
            .entry((table.clone(), grantee.to_string()))
            .or_default();
        for privilege in privileges {
            let option = granted.entry(*privilege).or_insert(false);
            *option |= grant_option;
        }
        Ok(())
    }

    fn revoke_table_privileges(
        &self,
        _session: &Session,
        table: &QualifiedObjectName,
        privileges: &BTreeSet<Privilege>,
        grantee: &str,
        grant_option: bool,
    ) -> MetadataResult<()> {
        let mut state = self.state.write();
        let exists = schema_mut(&mut state, &table.schema_name())?
            .tables
            .contains_key(&table.object_name);
        if !exists {
            return Err(MetadataError::TableNotFound(table.to_string()));
        }
        let key = (table.clone(), grantee.to_string());
        let now_empty = match state.grants.get_mut(&key) {
            Some(granted) => {
                for privilege in privileges {
                    if grant_option {
                        if let Some(option) = granted.get_mut(privilege) {
                            *option = false;
                        }
                    } else {
                        granted.remove(privilege);
                    }
                }
                granted.is_empty()
            }
            None => false,
        };
        if now_empty {
            state.grants.remove(&key);
        }
        Ok(())
    }

    fn call_procedure(
        &self,
        session: &Session,
        procedure: &QualifiedObjectName,
        arguments: &[Expression],
    ) -> MetadataResult<()> {
        let body = self
            .procedures
            .read()
            .get(procedure)
            .cloned()
            .ok_or_else(|| MetadataError::ProcedureNotFound(procedure.to_string()))?;
        body(session, arguments)
    }
}
