// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Low-memory killer policies
//!
//! A killer is a pure decision over a snapshot of the cluster: which single
//! query to kill to relieve memory pressure, if any. Ranking is by total
//! reservation, then by most recent creation, then by greatest query id.
//! Queries without any reservation are never chosen.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::pool::MemoryInfo;
use crate::coordinator::QueryId;

/// Memory held by one running query across the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMemoryInfo {
    pub query_id: QueryId,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub total_reservation_bytes: u64,
    /// Reservation per node id
    pub node_reservations: BTreeMap<String, u64>,
}

/// Last fresh memory snapshot of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMemorySnapshot {
    pub node_id: String,
    pub memory_info: MemoryInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LowMemoryKillerPolicy {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "total-reservation")]
    TotalReservation,
    #[serde(rename = "total-reservation-on-blocked-nodes")]
    TotalReservationOnBlockedNodes,
}

impl LowMemoryKillerPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LowMemoryKillerPolicy::None => "none",
            LowMemoryKillerPolicy::TotalReservation => "total-reservation",
            LowMemoryKillerPolicy::TotalReservationOnBlockedNodes => {
                "total-reservation-on-blocked-nodes"
            }
        }
    }
}

impl fmt::Display for LowMemoryKillerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LowMemoryKillerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(LowMemoryKillerPolicy::None),
            "total-reservation" => Ok(LowMemoryKillerPolicy::TotalReservation),
            "total-reservation-on-blocked-nodes" => {
                Ok(LowMemoryKillerPolicy::TotalReservationOnBlockedNodes)
            }
            other => Err(format!("Unknown low memory killer policy: {}", other)),
        }
    }
}

pub trait LowMemoryKiller: Send + Sync {
    fn policy(&self) -> LowMemoryKillerPolicy;

    fn choose_query_to_kill(
        &self,
        running_queries: &[QueryMemoryInfo],
        nodes: &[NodeMemorySnapshot],
    ) -> Option<QueryId>;
}

pub fn create_low_memory_killer(policy: LowMemoryKillerPolicy) -> Arc<dyn LowMemoryKiller> {
    match policy {
        LowMemoryKillerPolicy::None => Arc::new(NoneLowMemoryKiller),
        LowMemoryKillerPolicy::TotalReservation => Arc::new(TotalReservationLowMemoryKiller),
        LowMemoryKillerPolicy::TotalReservationOnBlockedNodes => {
            Arc::new(TotalReservationOnBlockedNodesLowMemoryKiller)
        }
    }
}

/// Pick the highest ranked query with a non-zero reservation
fn largest_reservation<'a>(
    candidates: impl Iterator<Item = &'a QueryMemoryInfo>,
) -> Option<QueryId> {
    candidates
        .filter(|query| query.total_reservation_bytes > 0)
        .max_by(|a, b| {
            a.total_reservation_bytes
                .cmp(&b.total_reservation_bytes)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.query_id.cmp(&b.query_id))
        })
        .map(|query| query.query_id.clone())
}

pub struct NoneLowMemoryKiller;

impl LowMemoryKiller for NoneLowMemoryKiller {
    fn policy(&self) -> LowMemoryKillerPolicy {
        LowMemoryKillerPolicy::None
    }

    fn choose_query_to_kill(&self, _: &[QueryMemoryInfo], _: &[NodeMemorySnapshot]) -> Option<QueryId> {
        None
    }
}

pub struct TotalReservationLowMemoryKiller;

impl LowMemoryKiller for TotalReservationLowMemoryKiller {
    fn policy(&self) -> LowMemoryKillerPolicy {
        LowMemoryKillerPolicy::TotalReservation
    }

    fn choose_query_to_kill(
        &self,
        running_queries: &[QueryMemoryInfo],
        _nodes: &[NodeMemorySnapshot],
    ) -> Option<QueryId> {
        largest_reservation(running_queries.iter())
    }
}

pub struct TotalReservationOnBlockedNodesLowMemoryKiller;

impl LowMemoryKiller for TotalReservationOnBlockedNodesLowMemoryKiller {
    fn policy(&self) -> LowMemoryKillerPolicy {
        LowMemoryKillerPolicy::TotalReservationOnBlockedNodes
    }

    fn choose_query_to_kill(
        &self,
        running_queries: &[QueryMemoryInfo],
        nodes: &[NodeMemorySnapshot],
    ) -> Option<QueryId> {
        let blocked: Vec<&MemoryInfo> = nodes
            .iter()
            .filter(|node| node.memory_info.is_blocked())
            .map(|node| &node.memory_info)
            .collect();
        if blocked.is_empty() {
            return None;
        }
        largest_reservation(running_queries.iter().filter(|query| {
            blocked
                .iter()
                .any(|info| info.query_reservation(&query.query_id) > 0)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::pool::MemoryPoolInfo;
    use crate::memory::DataSize;
    use chrono::TimeZone;

    const GB: u64 = DataSize::gigabytes(1).to_bytes();

    fn query(id: &str, bytes: u64, created_secs: i64) -> QueryMemoryInfo {
        QueryMemoryInfo {
            query_id: QueryId::from(id),
            created_at: chrono::Utc.timestamp_opt(created_secs, 0).unwrap(),
            total_reservation_bytes: bytes,
            node_reservations: BTreeMap::new(),
        }
    }

    fn node(id: &str, info: MemoryInfo) -> NodeMemorySnapshot {
        NodeMemorySnapshot {
            node_id: id.to_string(),
            memory_info: info,
        }
    }

    #[test]
    fn test_total_reservation_picks_largest() {
        let queries = vec![
            query("q1", 10 * GB, 1),
            query("q2", 25 * GB, 2),
            query("q3", 5 * GB, 3),
        ];
        let victim = TotalReservationLowMemoryKiller.choose_query_to_kill(&queries, &[]);
        assert_eq!(victim, Some(QueryId::from("q2")));
    }

    #[test]
    fn test_tie_breaks() {
        let queries = vec![query("q1", GB, 1), query("q2", GB, 5), query("q3", GB, 3)];
        assert_eq!(
            TotalReservationLowMemoryKiller.choose_query_to_kill(&queries, &[]),
            Some(QueryId::from("q2"))
        );

        let queries = vec![query("q_a", GB, 1), query("q_b", GB, 1)];
        assert_eq!(
            TotalReservationLowMemoryKiller.choose_query_to_kill(&queries, &[]),
            Some(QueryId::from("q_b"))
        );
    }

    #[test]
    fn test_zero_reservation_is_never_chosen() {
        let queries = vec![query("q1", 0, 1)];
        assert_eq!(
            TotalReservationLowMemoryKiller.choose_query_to_kill(&queries, &[]),
            None
        );
    }

    #[test]
    fn test_blocked_nodes_policy() {
        let nodes = vec![
            node(
                "blocked",
                MemoryInfo::new(MemoryPoolInfo::new(10 * GB).with_reservation("q1", 10 * GB)),
            ),
            node(
                "healthy",
                MemoryInfo::new(MemoryPoolInfo::new(30 * GB).with_reservation("q2", 25 * GB)),
            ),
        ];
        let queries = vec![query("q1", 10 * GB, 1), query("q2", 25 * GB, 2)];
        let killer = TotalReservationOnBlockedNodesLowMemoryKiller;
        assert_eq!(
            killer.choose_query_to_kill(&queries, &nodes),
            Some(QueryId::from("q1"))
        );
        assert_eq!(killer.choose_query_to_kill(&queries, &nodes[1..]), None);
    }

    #[test]
    fn test_blocked_nodes_tie_breaks() {
        let blocked = |a: &str, b: &str| {
            node(
                "blocked",
                MemoryInfo::new(
                    MemoryPoolInfo::new(10 * GB)
                        .with_reservation(a, 5 * GB)
                        .with_reservation(b, 5 * GB),
                ),
            )
        };
        let healthy = |a: &str, b: &str| {
            node(
                "healthy",
                MemoryInfo::new(
                    MemoryPoolInfo::new(100 * GB)
                        .with_reservation(a, 3 * GB)
                        .with_reservation(b, 3 * GB)
                        .with_reservation("q_elsewhere", 40 * GB),
                ),
            )
        };
        let killer = TotalReservationOnBlockedNodesLowMemoryKiller;

        // Equal totals: the newer query goes first
        let nodes = vec![blocked("q_old", "q_new"), healthy("q_old", "q_new")];
        let queries = vec![
            query("q_new", 8 * GB, 5),
            query("q_old", 8 * GB, 1),
            query("q_elsewhere", 40 * GB, 9),
        ];
        assert_eq!(
            killer.choose_query_to_kill(&queries, &nodes),
            Some(QueryId::from("q_new"))
        );

        // Equal totals and creation times: the greater id goes first
        let nodes = vec![blocked("q_a", "q_b"), healthy("q_a", "q_b")];
        let queries = vec![
            query("q_b", 8 * GB, 1),
            query("q_a", 8 * GB, 1),
            query("q_elsewhere", 40 * GB, 9),
        ];
        assert_eq!(
            killer.choose_query_to_kill(&queries, &nodes),
            Some(QueryId::from("q_b"))
        );
    }

    #[test]
    fn test_blocked_nodes_policy_ignores_memory_held_elsewhere() {
        let nodes = vec![
            node(
                "blocked",
                MemoryInfo::new(MemoryPoolInfo::new(10 * GB).with_reservation("finished", 10 * GB)),
            ),
            node(
                "healthy",
                MemoryInfo::new(MemoryPoolInfo::new(100 * GB).with_reservation("q_big", 60 * GB)),
            ),
        ];
        let queries = vec![query("q_big", 60 * GB, 1)];
        let killer = TotalReservationOnBlockedNodesLowMemoryKiller;
        assert_eq!(killer.choose_query_to_kill(&queries, &nodes), None);
        assert_eq!(
            TotalReservationLowMemoryKiller.choose_query_to_kill(&queries, &nodes),
            Some(QueryId::from("q_big"))
        );
    }

    #[test]
    fn test_none_policy() {
        let queries = vec![query("q1", 10 * GB, 1)];
        assert_eq!(NoneLowMemoryKiller.choose_query_to_kill(&queries, &[]), None);
        assert_eq!(
            create_low_memory_killer(LowMemoryKillerPolicy::None).policy(),
            LowMemoryKillerPolicy::None
        );
    }

    #[test]
    fn test_policy_names() {
        for policy in [
            LowMemoryKillerPolicy::None,
            LowMemoryKillerPolicy::TotalReservation,
            LowMemoryKillerPolicy::TotalReservationOnBlockedNodes,
        ] {
            assert_eq!(policy.as_str().parse::<LowMemoryKillerPolicy>(), Ok(policy));
        }
        assert!("largest".parse::<LowMemoryKillerPolicy>().is_err());
    }
}
