// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Registry of submitted queries
//!
//! Every execution is inserted once at submission and removed once, by the
//! retention sweep, after it reached a terminal state.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::query_id::QueryId;
use crate::exec::{ExecutionError, QueryExecution, QueryInfo};
use crate::memory::{QueryTracker, TrackedQuery};

#[derive(Default)]
pub struct QueryRegistry {
    queries: RwLock<HashMap<QueryId, Arc<dyn QueryExecution>>>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new execution. Ids are unique, a duplicate is a bug.
    pub fn register(&self, execution: Arc<dyn QueryExecution>) -> Result<(), ExecutionError> {
        let mut queries = self.queries.write();
        let query_id = execution.query_id().clone();
        if queries.contains_key(&query_id) {
            return Err(ExecutionError::Internal(format!(
                "Query {} is already registered",
                query_id
            )));
        }
        queries.insert(query_id, execution);
        Ok(())
    }

    pub fn get(&self, query_id: &QueryId) -> Option<Arc<dyn QueryExecution>> {
        self.queries.read().get(query_id).cloned()
    }

    /// Info of every registered query, oldest first
    pub fn list(&self) -> Vec<QueryInfo> {
        let mut infos: Vec<QueryInfo> = self
            .snapshot()
            .iter()
            .map(|execution| execution.query_info())
            .collect();
        infos.sort_by(|a, b| a.query_id.cmp(&b.query_id));
        infos
    }

    /// Registered executions, cloned out so the lock is released on return
    fn snapshot(&self) -> Vec<Arc<dyn QueryExecution>> {
        self.queries.read().values().cloned().collect()
    }

    /// Remove queries that finished more than `retention` ago
    pub fn remove_expired(&self, retention: Duration) -> Vec<QueryId> {
        let Ok(retention) = chrono::Duration::from_std(retention) else {
            return Vec::new();
        };
        let now = chrono::Utc::now();
        let mut removed = Vec::new();
        self.queries.write().retain(|query_id, execution| {
            let expired = execution
                .state_machine()
                .end_time()
                .map_or(false, |end| now.signed_duration_since(end) >= retention);
            if expired {
                removed.push(query_id.clone());
            }
            !expired
        });
        removed.sort();
        for query_id in &removed {
            log::debug!("Removed expired query {}", query_id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.queries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.read().is_empty()
    }
}

impl QueryTracker for QueryRegistry {
    fn running_queries(&self) -> Vec<TrackedQuery> {
        self.snapshot()
            .iter()
            .filter(|execution| !execution.state().is_done())
            .map(|execution| TrackedQuery {
                query_id: execution.query_id().clone(),
                created_at: execution.state_machine().created_at(),
                memory_limit: execution.memory_limit(),
            })
            .collect()
    }

    fn fail_query(&self, query_id: &QueryId, error: ExecutionError) {
        match self.get(query_id) {
            Some(execution) => execution.fail(error),
            None => log::debug!("Cannot fail unknown query {}", query_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{QueryState, QueryStateMachine};
    use crate::memory::DataSize;
    use crate::scheduler::StageId;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Weak;

    struct IdleExecution {
        query_id: QueryId,
        state: QueryStateMachine,
        /// Registry whose write lock is tried while the info is built
        observed: Mutex<Weak<QueryRegistry>>,
        writable_during_info: Mutex<Option<bool>>,
    }

    impl IdleExecution {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                query_id: QueryId::from(id),
                state: QueryStateMachine::new(QueryId::from(id)),
                observed: Mutex::new(Weak::new()),
                writable_during_info: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl QueryExecution for IdleExecution {
        fn query_id(&self) -> &QueryId {
            &self.query_id
        }

        fn state_machine(&self) -> &QueryStateMachine {
            &self.state
        }

        fn query_info(&self) -> QueryInfo {
            if let Some(registry) = self.observed.lock().upgrade() {
                let writable = registry.queries.try_write().is_some();
                *self.writable_during_info.lock() = Some(writable);
            }
            QueryInfo {
                query_id: self.query_id.clone(),
                state: self.state.state(),
                query_type: crate::coordinator::QueryType::Select,
                statement_kind: crate::ast::StatementKind::Query,
                query_text: String::new(),
                user: "alice".to_string(),
                created_at: self.state.created_at(),
                end_time: self.state.end_time(),
                session_updates: Vec::new(),
                error: self.state.failure(),
                execution_policy: None,
                stage_start_order: Vec::new(),
            }
        }

        fn memory_limit(&self) -> Option<DataSize> {
            Some(DataSize::megabytes(1))
        }

        async fn start(&self) {
            self.state.transition_to(QueryState::Running);
        }

        fn cancel(&self) {
            self.state
                .cancel(ExecutionError::Canceled("test".to_string()));
        }

        fn fail(&self, error: ExecutionError) {
            self.state.fail(error);
        }

        fn stage_finished(&self, _stage: StageId) -> Result<(), ExecutionError> {
            Ok(())
        }
    }

    #[test]
    fn test_register_once() {
        let registry = QueryRegistry::new();
        registry.register(IdleExecution::new("q1")).unwrap();
        assert!(registry.register(IdleExecution::new("q1")).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_tracker_sees_only_running_queries() {
        let registry = QueryRegistry::new();
        registry.register(IdleExecution::new("q1")).unwrap();
        registry.register(IdleExecution::new("q2")).unwrap();

        registry.fail_query(&QueryId::from("q2"), ExecutionError::ClusterOutOfMemory);
        registry.fail_query(&QueryId::from("missing"), ExecutionError::ClusterOutOfMemory);

        let running = registry.running_queries();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].query_id, QueryId::from("q1"));
        assert_eq!(running[0].memory_limit, Some(DataSize::megabytes(1)));
        assert_eq!(
            registry.get(&QueryId::from("q2")).unwrap().state(),
            QueryState::Failed
        );
    }

    #[test]
    fn test_remove_expired_keeps_running_queries() {
        let registry = QueryRegistry::new();
        registry.register(IdleExecution::new("q1")).unwrap();
        registry.register(IdleExecution::new("q2")).unwrap();
        registry.get(&QueryId::from("q2")).unwrap().cancel();

        assert!(registry.remove_expired(Duration::from_secs(3600)).is_empty());
        assert_eq!(
            registry.remove_expired(Duration::ZERO),
            vec![QueryId::from("q2")]
        );
        let remaining: Vec<QueryId> = registry.list().into_iter().map(|info| info.query_id).collect();
        assert_eq!(remaining, vec![QueryId::from("q1")]);
    }

    #[test]
    fn test_list_releases_lock_before_building_infos() {
        let registry = Arc::new(QueryRegistry::new());
        let execution = IdleExecution::new("q1");
        *execution.observed.lock() = Arc::downgrade(&registry);
        registry.register(execution.clone()).unwrap();

        assert_eq!(registry.list().len(), 1);
        assert_eq!(*execution.writable_during_info.lock(), Some(true));
    }
}
