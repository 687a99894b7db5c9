// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Stage dependency graph of a distributed query
//!
//! Edges point from a consuming stage to the stage producing its input. The
//! root stage produces the query output; stages without producers read
//! from sources.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageId(pub u32);

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One plan fragment executed as a stage on the workers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub id: StageId,
    /// Short description of the fragment, used by EXPLAIN
    pub fragment: String,
}

impl StageDescriptor {
    pub fn new(id: u32, fragment: impl Into<String>) -> Self {
        Self {
            id: StageId(id),
            fragment: fragment.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageGraphError {
    #[error("Stage graph is empty")]
    Empty,

    #[error("Duplicate stage {0}")]
    DuplicateStage(StageId),

    #[error("Unknown stage {0}")]
    UnknownStage(StageId),

    #[error("Stage graph contains a cycle through stage {0}")]
    Cycle(StageId),

    #[error("Stage {0} is not reachable from the root stage")]
    Unreachable(StageId),
}

#[derive(Debug, Clone)]
pub struct StageGraph {
    graph: DiGraph<StageDescriptor, ()>,
    indices: HashMap<StageId, NodeIndex>,
    root: StageId,
}

impl StageGraph {
    /// Build and validate a stage graph. `dependencies` are
    /// `(consumer, producer)` pairs.
    pub fn new(
        root: StageId,
        stages: Vec<StageDescriptor>,
        dependencies: &[(StageId, StageId)],
    ) -> Result<Self, StageGraphError> {
        if stages.is_empty() {
            return Err(StageGraphError::Empty);
        }

        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        for stage in stages {
            let id = stage.id;
            if indices.contains_key(&id) {
                return Err(StageGraphError::DuplicateStage(id));
            }
            indices.insert(id, graph.add_node(stage));
        }
        if !indices.contains_key(&root) {
            return Err(StageGraphError::UnknownStage(root));
        }

        for (consumer, producer) in dependencies {
            let from = *indices
                .get(consumer)
                .ok_or(StageGraphError::UnknownStage(*consumer))?;
            let to = *indices
                .get(producer)
                .ok_or(StageGraphError::UnknownStage(*producer))?;
            graph.update_edge(from, to, ());
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Err(StageGraphError::Cycle(graph[cycle.node_id()].id));
        }

        let stage_graph = Self {
            graph,
            indices,
            root,
        };
        let reachable: HashSet<StageId> = stage_graph.pre_order().into_iter().collect();
        if let Some(orphan) = stage_graph
            .stage_ids()
            .into_iter()
            .find(|id| !reachable.contains(id))
        {
            return Err(StageGraphError::Unreachable(orphan));
        }
        Ok(stage_graph)
    }

    /// Single-stage graph
    pub fn single(stage: StageDescriptor) -> Self {
        let root = stage.id;
        let mut graph = DiGraph::new();
        let mut indices = HashMap::new();
        indices.insert(root, graph.add_node(stage));
        Self {
            graph,
            indices,
            root,
        }
    }

    pub fn root(&self) -> StageId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn stage(&self, id: StageId) -> Option<&StageDescriptor> {
        self.indices.get(&id).map(|index| &self.graph[*index])
    }

    /// All stage ids in ascending order
    pub fn stage_ids(&self) -> Vec<StageId> {
        let mut ids: Vec<StageId> = self.indices.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Stages whose output `id` consumes, in ascending order
    pub fn producers(&self, id: StageId) -> Vec<StageId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Stages consuming the output of `id`, in ascending order
    pub fn consumers(&self, id: StageId) -> Vec<StageId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: StageId, direction: Direction) -> Vec<StageId> {
        let Some(index) = self.indices.get(&id) else {
            return Vec::new();
        };
        let mut ids: Vec<StageId> = self
            .graph
            .neighbors_directed(*index, direction)
            .map(|neighbor| self.graph[neighbor].id)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Depth-first order from the root, consumers before their producers
    pub fn pre_order(&self) -> Vec<StageId> {
        let mut order = Vec::with_capacity(self.len());
        let mut visited = HashSet::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            // reversed so the lowest id is visited first
            for producer in self.producers(id).into_iter().rev() {
                if !visited.contains(&producer) {
                    stack.push(producer);
                }
            }
        }
        order
    }

    /// Longest distance of each stage from a source stage. Sources have depth 0.
    pub fn depths_from_sources(&self) -> BTreeMap<StageId, usize> {
        let mut depths = BTreeMap::new();
        // producers come after consumers in topological order
        let order = toposort(&self.graph, None).unwrap_or_default();
        for index in order.into_iter().rev() {
            let id = self.graph[index].id;
            let depth = self
                .producers(id)
                .iter()
                .filter_map(|producer| depths.get(producer))
                .map(|depth| depth + 1)
                .max()
                .unwrap_or(0);
            depths.insert(id, depth);
        }
        depths
    }

    /// Indented rendering of the graph starting at the root
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut visited = HashSet::new();
        self.render_stage(self.root, 0, &mut visited, &mut out);
        out
    }

    fn render_stage(
        &self,
        id: StageId,
        indent: usize,
        visited: &mut HashSet<StageId>,
        out: &mut String,
    ) {
        let fragment = self.stage(id).map(|s| s.fragment.as_str()).unwrap_or("");
        if !visited.insert(id) {
            out.push_str(&format!("{}Stage {} (see above)\n", "    ".repeat(indent), id));
            return;
        }
        out.push_str(&format!("{}Stage {}: {}\n", "    ".repeat(indent), id, fragment));
        for producer in self.producers(id) {
            self.render_stage(producer, indent + 1, visited, out);
        }
    }
}
