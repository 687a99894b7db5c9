// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Cluster-wide memory accounting
//!
//! On every cycle the manager polls each worker node, aggregates the
//! reservations per query and per pool, fails queries above their own
//! limit and, when a pool has been out of memory long enough, asks the
//! low-memory killer for a victim.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};

use super::killer::{LowMemoryKiller, LowMemoryKillerPolicy, NodeMemorySnapshot, QueryMemoryInfo};
use super::node::{MemoryError, NodeMemoryClient, NodeRegistry, WorkerNode};
use super::pool::{ClusterMemoryPoolInfo, MemoryInfo, MemoryPoolId};
use super::DataSize;
use crate::config::MemoryManagerConfig;
use crate::coordinator::QueryId;
use crate::exec::ExecutionError;

/// A running query as seen by the memory manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedQuery {
    pub query_id: QueryId,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Limit requested by the session, if any
    pub memory_limit: Option<DataSize>,
}

/// Owner of the running queries, used to read them and to fail them
pub trait QueryTracker: Send + Sync {
    fn running_queries(&self) -> Vec<TrackedQuery>;

    /// Fail the query asynchronously. Unknown or finished queries are ignored.
    fn fail_query(&self, query_id: &QueryId, error: ExecutionError);
}

/// One decision of the low-memory killer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KillRecord {
    pub query_id: QueryId,
    /// Reservation held by the query when it was killed
    pub freed_bytes_estimate: u64,
    pub policy: LowMemoryKillerPolicy,
    pub killed_at: chrono::DateTime<chrono::Utc>,
}

/// Summary of one memory cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub polled_nodes: usize,
    pub failed_nodes: Vec<String>,
    pub exceeded_limit: Vec<QueryId>,
    pub killed: Option<QueryId>,
}

#[derive(Debug, Clone)]
struct NodeState {
    memory_info: MemoryInfo,
    stale: bool,
    updated_at: chrono::DateTime<chrono::Utc>,
    refreshed_at: Instant,
}

#[derive(Default)]
struct ManagerState {
    nodes: HashMap<String, NodeState>,
    pools: BTreeMap<MemoryPoolId, ClusterMemoryPoolInfo>,
    out_of_memory_since: Option<Instant>,
    last_killed: Option<(QueryId, Instant)>,
    kill_history: VecDeque<KillRecord>,
}

/// Per-query totals over the node snapshots that still count
#[derive(Default)]
struct QueryReservations {
    total: u64,
    per_node: BTreeMap<String, u64>,
}

pub struct ClusterMemoryManager {
    config: MemoryManagerConfig,
    node_registry: Arc<dyn NodeRegistry>,
    client: Arc<dyn NodeMemoryClient>,
    tracker: Arc<dyn QueryTracker>,
    killer: Arc<dyn LowMemoryKiller>,
    state: Mutex<ManagerState>,
    /// Serializes cycles
    cycle_lock: tokio::sync::Mutex<()>,
}

impl ClusterMemoryManager {
    pub fn new(
        config: MemoryManagerConfig,
        node_registry: Arc<dyn NodeRegistry>,
        client: Arc<dyn NodeMemoryClient>,
        tracker: Arc<dyn QueryTracker>,
        killer: Arc<dyn LowMemoryKiller>,
    ) -> Self {
        Self {
            config,
            node_registry,
            client,
            tracker,
            killer,
            state: Mutex::new(ManagerState::default()),
            cycle_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &MemoryManagerConfig {
        &self.config
    }

    /// Spawn the periodic polling loop. A slow cycle delays the next tick.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        log::info!(
            "Starting cluster memory manager (interval {:?}, killer {})",
            self.config.poll_interval,
            self.killer.policy()
        );
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// Run one full memory cycle
    pub async fn run_cycle(&self) -> CycleReport {
        let _cycle = self.cycle_lock.lock().await;
        let mut report = CycleReport::default();

        let nodes = self.node_registry.active_nodes();
        report.polled_nodes = nodes.len();
        let results = self.poll_nodes(&nodes).await;

        let (snapshots, reservations) = {
            let mut state = self.state.lock();
            report.failed_nodes = Self::update_nodes(&mut state, &nodes, results);
            let (snapshots, reservations, pools) =
                Self::aggregate(&state, Instant::now(), self.config.stale_snapshot_max_age);
            state.pools = pools;
            (snapshots, reservations)
        };

        let running = self.tracker.running_queries();
        let mut candidates = Vec::with_capacity(running.len());
        for query in running {
            let usage = reservations.get(&query.query_id);
            let total = usage.map_or(0, |usage| usage.total);
            let limit = query.memory_limit.unwrap_or(self.config.query_max_memory);
            if total > limit.to_bytes() {
                log::warn!(
                    "Query {} exceeded its memory limit of {} (reserved {})",
                    query.query_id,
                    limit,
                    DataSize::bytes(total)
                );
                self.tracker.fail_query(
                    &query.query_id,
                    ExecutionError::ExceededMemoryLimit {
                        limit,
                        reserved: DataSize::bytes(total),
                    },
                );
                report.exceeded_limit.push(query.query_id);
                continue;
            }
            candidates.push(QueryMemoryInfo {
                query_id: query.query_id,
                created_at: query.created_at,
                total_reservation_bytes: total,
                node_reservations: usage.map(|usage| usage.per_node.clone()).unwrap_or_default(),
            });
        }

        report.killed = self.maybe_kill(&candidates, &snapshots);
        report
    }

    async fn poll_nodes(&self, nodes: &[WorkerNode]) -> Vec<(WorkerNode, Result<MemoryInfo, MemoryError>)> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_polls));
        let mut polls = JoinSet::new();
        for node in nodes.iter().cloned() {
            let client = self.client.clone();
            let permits = permits.clone();
            let request_timeout = self.config.request_timeout;
            polls.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        match tokio::time::timeout(request_timeout, client.get_memory_info(&node))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(MemoryError::Timeout {
                                node: node.node_id.clone(),
                                timeout: request_timeout,
                            }),
                        }
                    }
                    Err(e) => Err(MemoryError::Aborted {
                        node: node.node_id.clone(),
                        message: e.to_string(),
                    }),
                };
                (node, result)
            });
        }

        let mut results = Vec::with_capacity(nodes.len());
        while let Some(joined) = polls.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                // the node is treated as failed below since it has no result
                Err(e) => log::warn!("Memory poll task failed: {}", e),
            }
        }
        results
    }

    /// Replace snapshots with fresh results. Returns the ids of failed nodes.
    fn update_nodes(
        state: &mut ManagerState,
        nodes: &[WorkerNode],
        results: Vec<(WorkerNode, Result<MemoryInfo, MemoryError>)>,
    ) -> Vec<String> {
        let active: HashSet<&str> = nodes.iter().map(|node| node.node_id.as_str()).collect();
        state
            .nodes
            .retain(|node_id, _| active.contains(node_id.as_str()));

        let mut refreshed = HashSet::new();
        for (node, result) in results {
            match result {
                Ok(memory_info) => {
                    refreshed.insert(node.node_id.clone());
                    state.nodes.insert(
                        node.node_id,
                        NodeState {
                            memory_info,
                            stale: false,
                            updated_at: chrono::Utc::now(),
                            refreshed_at: Instant::now(),
                        },
                    );
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        let mut failed: Vec<String> = nodes
            .iter()
            .filter(|node| !refreshed.contains(&node.node_id))
            .map(|node| node.node_id.clone())
            .collect();
        failed.sort();
        for node_id in &failed {
            if let Some(node) = state.nodes.get_mut(node_id) {
                node.stale = true;
            }
        }
        failed
    }

    /// Sum the snapshots per pool and per query. A stale snapshot keeps
    /// counting until it is older than `max_age`, so one missed poll does
    /// not hide a blocked node.
    fn aggregate(
        state: &ManagerState,
        now: Instant,
        max_age: std::time::Duration,
    ) -> (
        Vec<NodeMemorySnapshot>,
        HashMap<QueryId, QueryReservations>,
        BTreeMap<MemoryPoolId, ClusterMemoryPoolInfo>,
    ) {
        let mut snapshots = Vec::new();
        let mut reservations: HashMap<QueryId, QueryReservations> = HashMap::new();
        let mut pools: BTreeMap<MemoryPoolId, ClusterMemoryPoolInfo> = BTreeMap::new();
        let mut assigned: BTreeMap<MemoryPoolId, HashSet<QueryId>> = BTreeMap::new();

        let counted = state.nodes.iter().filter(|(_, node)| {
            !node.stale || now.duration_since(node.refreshed_at) <= max_age
        });
        for (node_id, node) in counted {
            let blocked = node.memory_info.is_blocked();
            for (pool_id, pool) in &node.memory_info.pools {
                let cluster_pool = pools.entry(*pool_id).or_default();
                cluster_pool.total_distributed_bytes += pool.max_bytes;
                cluster_pool.reserved_distributed_bytes += pool.reserved_bytes;
                cluster_pool.nodes += 1;
                if blocked && *pool_id == MemoryPoolId::General {
                    cluster_pool.blocked_nodes += 1;
                }
                for (query_id, bytes) in &pool.query_memory_reservations {
                    let usage = reservations.entry(query_id.clone()).or_default();
                    usage.total += bytes;
                    *usage.per_node.entry(node_id.clone()).or_insert(0) += bytes;
                    if *bytes > 0 {
                        assigned.entry(*pool_id).or_default().insert(query_id.clone());
                    }
                }
            }
            snapshots.push(NodeMemorySnapshot {
                node_id: node_id.clone(),
                memory_info: node.memory_info.clone(),
            });
        }
        for (pool_id, queries) in assigned {
            if let Some(pool) = pools.get_mut(&pool_id) {
                pool.assigned_queries = queries.len();
            }
        }
        snapshots.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        (snapshots, reservations, pools)
    }

    fn maybe_kill(
        &self,
        candidates: &[QueryMemoryInfo],
        snapshots: &[NodeMemorySnapshot],
    ) -> Option<QueryId> {
        let victim = {
            let mut state = self.state.lock();
            let now = Instant::now();

            let out_of_memory = state.pools.values().any(ClusterMemoryPoolInfo::is_out_of_memory);
            if !out_of_memory {
                state.out_of_memory_since = None;
                return None;
            }
            let since = *state.out_of_memory_since.get_or_insert(now);

            if let Some((last, killed_at)) = &state.last_killed {
                let still_running = candidates.iter().any(|query| &query.query_id == last);
                if still_running && now.duration_since(*killed_at) < self.config.killed_query_timeout
                {
                    log::debug!("Waiting for killed query {} to terminate", last);
                    return None;
                }
                state.last_killed = None;
            }

            if now.duration_since(since) < self.config.kill_on_out_of_memory_delay {
                return None;
            }

            let victim = self.killer.choose_query_to_kill(candidates, snapshots)?;
            let freed = candidates
                .iter()
                .find(|query| query.query_id == victim)
                .map_or(0, |query| query.total_reservation_bytes);
            state.last_killed = Some((victim.clone(), now));
            state.kill_history.push_back(KillRecord {
                query_id: victim.clone(),
                freed_bytes_estimate: freed,
                policy: self.killer.policy(),
                killed_at: chrono::Utc::now(),
            });
            while state.kill_history.len() > self.config.kill_history_capacity {
                state.kill_history.pop_front();
            }
            log::warn!(
                "Cluster is out of memory, killing query {} (reserved {}) using policy {}",
                victim,
                DataSize::bytes(freed),
                self.killer.policy()
            );
            victim
        };

        self.tracker
            .fail_query(&victim, ExecutionError::ClusterOutOfMemory);
        Some(victim)
    }

    /// Cluster-wide view of every pool after the last cycle
    pub fn pools(&self) -> BTreeMap<MemoryPoolId, ClusterMemoryPoolInfo> {
        self.state.lock().pools.clone()
    }

    pub fn pool_info(&self, pool: MemoryPoolId) -> Option<ClusterMemoryPoolInfo> {
        self.state.lock().pools.get(&pool).cloned()
    }

    /// Most recent kills, oldest first
    pub fn kill_history(&self) -> Vec<KillRecord> {
        self.state.lock().kill_history.iter().cloned().collect()
    }

    /// Last known snapshot of a node and whether it is stale
    pub fn node_snapshot(&self, node_id: &str) -> Option<(MemoryInfo, bool)> {
        self.state
            .lock()
            .nodes
            .get(node_id)
            .map(|node| (node.memory_info.clone(), node.stale))
    }

    pub fn node_updated_at(&self, node_id: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        self.state.lock().nodes.get(node_id).map(|node| node.updated_at)
    }
}
