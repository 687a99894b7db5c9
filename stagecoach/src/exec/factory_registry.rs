// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use std::collections::HashMap;
use std::sync::Arc;

use super::execution::QueryExecutionFactory;
use super::write_stmt::DataDefinitionTaskRegistry;
use crate::ast::StatementKind;
use crate::config::ConfigError;
use crate::coordinator::{data_definition_kinds, is_data_definition};

/// Binding from statement kind to the factory creating its executions
///
/// Every data-definition kind is bound to the one generic data-definition
/// factory; every other kind to the distributed query factory. Bindings are
/// fixed once the coordinator starts.
#[derive(Clone, Default)]
pub struct QueryExecutionFactoryRegistry {
    factories: HashMap<StatementKind, Arc<dyn QueryExecutionFactory>>,
}

impl QueryExecutionFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every statement kind according to its classification
    pub fn bind(
        data_definition: Arc<dyn QueryExecutionFactory>,
        sql: Arc<dyn QueryExecutionFactory>,
    ) -> Self {
        let mut registry = Self::new();
        for kind in StatementKind::ALL {
            let factory = if is_data_definition(kind) {
                data_definition.clone()
            } else {
                sql.clone()
            };
            registry.bind_factory(kind, factory);
        }
        registry
    }

    /// Override the binding of one kind, returning the factory it replaced
    pub fn bind_factory(
        &mut self,
        kind: StatementKind,
        factory: Arc<dyn QueryExecutionFactory>,
    ) -> Option<Arc<dyn QueryExecutionFactory>> {
        self.factories.insert(kind, factory)
    }

    pub fn get(&self, kind: StatementKind) -> Option<Arc<dyn QueryExecutionFactory>> {
        self.factories.get(&kind).cloned()
    }

    /// Cross-check bindings against the classifier and the task registry
    pub fn verify(&self, tasks: &DataDefinitionTaskRegistry) -> Result<(), ConfigError> {
        for kind in StatementKind::ALL {
            let factory = self
                .factories
                .get(&kind)
                .ok_or_else(|| ConfigError::MissingBinding(kind.to_string()))?;
            let expects_ddl = is_data_definition(kind);
            if factory.is_data_definition() != expects_ddl {
                return Err(ConfigError::BindingMismatch {
                    kind: kind.to_string(),
                    expected: if expects_ddl {
                        "a data definition factory".to_string()
                    } else {
                        "a query factory".to_string()
                    },
                    actual: factory.name().to_string(),
                });
            }
        }

        let expected = data_definition_kinds();
        let registered = tasks.kinds();
        if let Some(missing) = expected.difference(&registered).next() {
            return Err(ConfigError::Invalid(format!(
                "No data definition task registered for statement {}",
                missing
            )));
        }
        if let Some(extra) = registered.difference(&expected).next() {
            return Err(ConfigError::Invalid(format!(
                "Data definition task registered for non data definition statement {}",
                extra
            )));
        }
        Ok(())
    }
}
