// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution policies decide the order in which stages are started

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::all_at_once::AllAtOnceExecutionPolicy;
use super::phased::PhasedExecutionPolicy;
use super::stage_graph::{StageGraph, StageId};

/// Named scheduling strategy selected per query
pub trait ExecutionPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn create_execution_schedule(&self, graph: &StageGraph) -> Box<dyn ExecutionSchedule>;
}

/// Per-query schedule produced by an [`ExecutionPolicy`]
///
/// The scheduler repeatedly asks for the next batch of stages, starts them
/// in the returned order and reports each start back. Every stage is
/// released exactly once.
pub trait ExecutionSchedule: Send {
    /// Stages that may be started now. Empty when the schedule is waiting
    /// for started reports or is finished.
    fn next_stages(&mut self) -> Vec<StageId>;

    fn stage_started(&mut self, stage: StageId);

    /// Whether every stage has been released and reported started
    fn is_finished(&self) -> bool;
}

/// Lookup table of execution policies by name, read-only after startup
#[derive(Clone, Default)]
pub struct ExecutionPolicyRegistry {
    policies: BTreeMap<String, Arc<dyn ExecutionPolicy>>,
}

impl ExecutionPolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_policies() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AllAtOnceExecutionPolicy));
        registry.register(Arc::new(PhasedExecutionPolicy));
        registry
    }

    pub fn register(&mut self, policy: Arc<dyn ExecutionPolicy>) {
        self.policies.insert(policy.name().to_string(), policy);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ExecutionPolicy>> {
        self.policies.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.policies.keys().cloned().collect()
    }
}

/// Bookkeeping shared by schedules: which stages were started
#[derive(Debug, Default)]
pub(crate) struct StartedStages {
    started: BTreeSet<StageId>,
}

impl StartedStages {
    pub(crate) fn record(&mut self, stage: StageId) {
        self.started.insert(stage);
    }

    pub(crate) fn contains_all(&self, stages: &[StageId]) -> bool {
        stages.iter().all(|stage| self.started.contains(stage))
    }

    pub(crate) fn len(&self) -> usize {
        self.started.len()
    }
}
