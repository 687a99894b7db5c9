// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use std::collections::{BTreeMap, VecDeque};

use super::policy::{ExecutionPolicy, ExecutionSchedule, StartedStages};
use super::stage_graph::{StageGraph, StageId};

/// Stages are grouped into phases by their depth from the source stages.
/// A phase is released only after every stage of the previous phase has
/// started.
pub struct PhasedExecutionPolicy;

impl ExecutionPolicy for PhasedExecutionPolicy {
    fn name(&self) -> &'static str {
        "phased"
    }

    fn create_execution_schedule(&self, graph: &StageGraph) -> Box<dyn ExecutionSchedule> {
        Box::new(PhasedExecutionSchedule::new(graph))
    }
}

pub struct PhasedExecutionSchedule {
    phases: VecDeque<Vec<StageId>>,
    /// Phase released last, waiting for its stages to start
    current: Option<Vec<StageId>>,
    started: StartedStages,
}

impl PhasedExecutionSchedule {
    pub fn new(graph: &StageGraph) -> Self {
        let mut by_depth: BTreeMap<usize, Vec<StageId>> = BTreeMap::new();
        for (stage, depth) in graph.depths_from_sources() {
            by_depth.entry(depth).or_default().push(stage);
        }
        Self {
            phases: by_depth.into_values().collect(),
            current: None,
            started: StartedStages::default(),
        }
    }

    /// Remaining phases, including the one in flight
    pub fn phase_count(&self) -> usize {
        self.phases.len() + usize::from(self.current.is_some())
    }
}

impl ExecutionSchedule for PhasedExecutionSchedule {
    fn next_stages(&mut self) -> Vec<StageId> {
        if let Some(current) = &self.current {
            if !self.started.contains_all(current) {
                return Vec::new();
            }
            self.current = None;
        }
        match self.phases.pop_front() {
            Some(phase) => {
                self.current = Some(phase.clone());
                phase
            }
            None => Vec::new(),
        }
    }

    fn stage_started(&mut self, stage: StageId) {
        self.started.record(stage);
    }

    fn is_finished(&self) -> bool {
        self.phases.is_empty()
            && self
                .current
                .as_ref()
                .map_or(true, |current| self.started.contains_all(current))
    }
}
