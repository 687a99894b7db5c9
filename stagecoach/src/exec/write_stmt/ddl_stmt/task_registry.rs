// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::ast::StatementKind;
use crate::exec::write_stmt::ddl_stmt::*;
use crate::exec::write_stmt::session_stmt::*;
use crate::exec::write_stmt::statement_base::DataDefinitionTask;
use crate::exec::write_stmt::transaction::*;

/// Lookup table from statement kind to data-definition task
///
/// Built once at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct DataDefinitionTaskRegistry {
    tasks: HashMap<StatementKind, Arc<dyn DataDefinitionTask>>,
}

impl DataDefinitionTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding a task for every data-definition statement
    pub fn with_default_tasks() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CreateSchemaTask));
        registry.register(Arc::new(DropSchemaTask));
        registry.register(Arc::new(RenameSchemaTask));
        registry.register(Arc::new(CreateTableTask));
        registry.register(Arc::new(DropTableTask));
        registry.register(Arc::new(AddColumnTask));
        registry.register(Arc::new(RenameTableTask));
        registry.register(Arc::new(RenameColumnTask));
        registry.register(Arc::new(DropColumnTask));
        registry.register(Arc::new(CreateViewTask));
        registry.register(Arc::new(DropViewTask));
        registry.register(Arc::new(CreateModelTask));
        registry.register(Arc::new(DeleteModelTask));
        registry.register(Arc::new(UseTask));
        registry.register(Arc::new(SetSessionTask));
        registry.register(Arc::new(ResetSessionTask));
        registry.register(Arc::new(StartTransactionTask));
        registry.register(Arc::new(CommitTask));
        registry.register(Arc::new(RollbackTask));
        registry.register(Arc::new(GrantTask));
        registry.register(Arc::new(RevokeTask));
        registry.register(Arc::new(PrepareTask));
        registry.register(Arc::new(DeallocateTask));
        registry.register(Arc::new(CallTask));
        registry.register(Arc::new(SetPathTask));
        registry
    }

    /// Register `task` for its statement kind, returning the task it replaced
    pub fn register(
        &mut self,
        task: Arc<dyn DataDefinitionTask>,
    ) -> Option<Arc<dyn DataDefinitionTask>> {
        self.tasks.insert(task.kind(), task)
    }

    pub fn get(&self, kind: StatementKind) -> Option<Arc<dyn DataDefinitionTask>> {
        self.tasks.get(&kind).cloned()
    }

    pub fn kinds(&self) -> BTreeSet<StatementKind> {
        self.tasks.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tasks_are_keyed_by_their_kind() {
        let registry = DataDefinitionTaskRegistry::with_default_tasks();
        assert_eq!(registry.len(), 25);
        for kind in registry.kinds() {
            let task = registry.get(kind).unwrap();
            assert_eq!(task.kind(), kind);
        }
        assert!(registry.get(StatementKind::Query).is_none());
    }
}
