// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use super::policy::{ExecutionPolicy, ExecutionSchedule, StartedStages};
use super::stage_graph::{StageGraph, StageId};

/// Every stage is schedulable immediately. Consumers are released before
/// their producers so output buffers exist when data starts flowing.
pub struct AllAtOnceExecutionPolicy;

impl ExecutionPolicy for AllAtOnceExecutionPolicy {
    fn name(&self) -> &'static str {
        "all-at-once"
    }

    fn create_execution_schedule(&self, graph: &StageGraph) -> Box<dyn ExecutionSchedule> {
        Box::new(AllAtOnceExecutionSchedule::new(graph))
    }
}

pub struct AllAtOnceExecutionSchedule {
    pending: Vec<StageId>,
    total: usize,
    started: StartedStages,
}

impl AllAtOnceExecutionSchedule {
    pub fn new(graph: &StageGraph) -> Self {
        let pending = graph.pre_order();
        Self {
            total: pending.len(),
            pending,
            started: StartedStages::default(),
        }
    }
}

impl ExecutionSchedule for AllAtOnceExecutionSchedule {
    fn next_stages(&mut self) -> Vec<StageId> {
        std::mem::take(&mut self.pending)
    }

    fn stage_started(&mut self, stage: StageId) {
        self.started.record(stage);
    }

    fn is_finished(&self) -> bool {
        self.pending.is_empty() && self.started.len() == self.total
    }
}
