// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Worker nodes and the transport used to poll their memory

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::pool::MemoryInfo;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerNode {
    pub node_id: String,
    pub address: String,
}

impl WorkerNode {
    pub fn new(node_id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for WorkerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.node_id, self.address)
    }
}

/// Errors raised while polling a node. These never fail a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Error fetching memory info from {node}: {message}")]
    Transport { node: String, message: String },

    #[error("Timed out fetching memory info from {node} after {timeout:?}")]
    Timeout { node: String, timeout: Duration },

    #[error("Memory poll of {node} was aborted: {message}")]
    Aborted { node: String, message: String },
}

/// Transport used to fetch a node's memory pools
#[async_trait]
pub trait NodeMemoryClient: Send + Sync {
    async fn get_memory_info(&self, node: &WorkerNode) -> Result<MemoryInfo, MemoryError>;
}

/// Source of the current cluster membership
pub trait NodeRegistry: Send + Sync {
    fn active_nodes(&self) -> Vec<WorkerNode>;
}

/// Node registry with membership managed by the embedder
#[derive(Debug, Default)]
pub struct StaticNodeRegistry {
    nodes: RwLock<Vec<WorkerNode>>,
}

impl StaticNodeRegistry {
    pub fn new(nodes: Vec<WorkerNode>) -> Self {
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    pub fn add_node(&self, node: WorkerNode) {
        let mut nodes = self.nodes.write();
        if !nodes.contains(&node) {
            nodes.push(node);
        }
    }

    pub fn remove_node(&self, node_id: &str) {
        self.nodes.write().retain(|node| node.node_id != node_id);
    }
}

impl NodeRegistry for StaticNodeRegistry {
    fn active_nodes(&self) -> Vec<WorkerNode> {
        self.nodes.read().clone()
    }
}
