// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Memory pool snapshots reported by worker nodes

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::coordinator::QueryId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryPoolId {
    General,
    Reserved,
}

impl MemoryPoolId {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryPoolId::General => "general",
            MemoryPoolId::Reserved => "reserved",
        }
    }
}

impl fmt::Display for MemoryPoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one pool on one node at poll time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPoolInfo {
    pub max_bytes: u64,
    pub reserved_bytes: u64,
    pub query_memory_reservations: HashMap<QueryId, u64>,
}

impl MemoryPoolInfo {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    /// Add a query reservation, keeping `reserved_bytes` in step
    pub fn with_reservation(mut self, query_id: impl Into<QueryId>, bytes: u64) -> Self {
        *self
            .query_memory_reservations
            .entry(query_id.into())
            .or_insert(0) += bytes;
        self.reserved_bytes += bytes;
        self
    }

    /// Zero when the pool is full or over-committed
    pub fn free_bytes(&self) -> u64 {
        self.max_bytes.saturating_sub(self.reserved_bytes)
    }

    pub fn is_full(&self) -> bool {
        self.reserved_bytes >= self.max_bytes
    }
}

/// Memory state of one worker node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub pools: BTreeMap<MemoryPoolId, MemoryPoolInfo>,
}

impl MemoryInfo {
    pub fn new(general: MemoryPoolInfo) -> Self {
        let mut pools = BTreeMap::new();
        pools.insert(MemoryPoolId::General, general);
        Self { pools }
    }

    pub fn with_reserved_pool(mut self, reserved: MemoryPoolInfo) -> Self {
        self.pools.insert(MemoryPoolId::Reserved, reserved);
        self
    }

    pub fn pool(&self, id: MemoryPoolId) -> Option<&MemoryPoolInfo> {
        self.pools.get(&id)
    }

    /// A node is blocked when its general pool has no free memory left
    pub fn is_blocked(&self) -> bool {
        self.pool(MemoryPoolId::General)
            .map_or(false, MemoryPoolInfo::is_full)
    }

    /// Reservation of `query_id` on this node across all pools
    pub fn query_reservation(&self, query_id: &QueryId) -> u64 {
        self.pools
            .values()
            .filter_map(|pool| pool.query_memory_reservations.get(query_id))
            .sum()
    }
}

/// Cluster-wide view of one pool, aggregated over fresh node snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMemoryPoolInfo {
    pub total_distributed_bytes: u64,
    pub reserved_distributed_bytes: u64,
    pub blocked_nodes: usize,
    pub assigned_queries: usize,
    pub nodes: usize,
}

impl ClusterMemoryPoolInfo {
    pub fn is_out_of_memory(&self) -> bool {
        self.reserved_distributed_bytes > self.total_distributed_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_node() {
        let info = MemoryInfo::new(MemoryPoolInfo::new(100).with_reservation("q1", 100));
        assert!(info.is_blocked());
        assert_eq!(info.pool(MemoryPoolId::General).unwrap().free_bytes(), 0);

        let info = MemoryInfo::new(MemoryPoolInfo::new(100).with_reservation("q1", 40))
            .with_reserved_pool(MemoryPoolInfo::new(50).with_reservation("q1", 50));
        assert!(!info.is_blocked());
        assert_eq!(info.query_reservation(&QueryId::from("q1")), 90);
    }

    #[test]
    fn test_blocked_node_with_pool_sizes_beyond_i64() {
        let huge = u64::MAX - 10;
        let free = MemoryInfo::new(MemoryPoolInfo::new(huge).with_reservation("q1", 1));
        assert!(!free.is_blocked());
        assert_eq!(free.pool(MemoryPoolId::General).unwrap().free_bytes(), huge - 1);

        let full = MemoryInfo::new(MemoryPoolInfo::new(10).with_reservation("q1", huge));
        assert!(full.is_blocked());
        assert_eq!(full.pool(MemoryPoolId::General).unwrap().free_bytes(), 0);
    }
}
