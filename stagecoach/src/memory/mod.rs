// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cluster memory management
//!
//! Worker nodes report their memory pools; the [`ClusterMemoryManager`]
//! aggregates them and enforces per-query and cluster-wide limits with the
//! help of a [`LowMemoryKiller`].

pub mod cluster_memory_manager;
pub mod data_size;
pub mod killer;
pub mod node;
pub mod pool;

pub use cluster_memory_manager::{
    ClusterMemoryManager, CycleReport, KillRecord, QueryTracker, TrackedQuery,
};
pub use data_size::DataSize;
pub use killer::{
    create_low_memory_killer, LowMemoryKiller, LowMemoryKillerPolicy, NodeMemorySnapshot,
    NoneLowMemoryKiller, QueryMemoryInfo, TotalReservationLowMemoryKiller,
    TotalReservationOnBlockedNodesLowMemoryKiller,
};
pub use node::{MemoryError, NodeMemoryClient, NodeRegistry, StaticNodeRegistry, WorkerNode};
pub use pool::{ClusterMemoryPoolInfo, MemoryInfo, MemoryPoolId, MemoryPoolInfo};
