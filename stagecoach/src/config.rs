// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Coordinator configuration
//!
//! Configuration is loaded once at startup. Any inconsistency is a
//! [`ConfigError`] and the coordinator refuses to start.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::memory::{DataSize, LowMemoryKillerPolicy};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Statement {kind} is bound to {actual} but must be bound to {expected}")]
    BindingMismatch {
        kind: String,
        expected: String,
        actual: String,
    },

    #[error("No execution factory registered for statement {0}")]
    MissingBinding(String),

    #[error("Unknown execution policy: {0}")]
    UnknownExecutionPolicy(String),
}

/// Settings of the cluster memory manager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryManagerConfig {
    /// Time between two memory polling cycles
    pub poll_interval: Duration,
    /// Timeout of a single node memory request
    pub request_timeout: Duration,
    /// Maximum number of nodes polled concurrently
    pub max_concurrent_polls: usize,
    /// Per-query memory limit when the session does not set one
    pub query_max_memory: DataSize,
    /// How long the cluster must stay out of memory before a query is killed
    pub kill_on_out_of_memory_delay: Duration,
    /// How long a killed query may keep running before the killer acts again
    pub killed_query_timeout: Duration,
    /// Number of kill decisions remembered for inspection
    pub kill_history_capacity: usize,
    /// How long the last snapshot of an unreachable node still counts
    pub stale_snapshot_max_age: Duration,
    pub low_memory_killer_policy: LowMemoryKillerPolicy,
}

impl Default for MemoryManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            max_concurrent_polls: 16,
            query_max_memory: DataSize::gigabytes(20),
            kill_on_out_of_memory_delay: Duration::from_secs(300),
            killed_query_timeout: Duration::from_secs(60),
            kill_history_capacity: 100,
            stale_snapshot_max_age: Duration::from_secs(30),
            low_memory_killer_policy: LowMemoryKillerPolicy::None,
        }
    }
}

impl MemoryManagerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_zero() {
            return Err("poll_interval must be greater than zero".to_string());
        }
        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than zero".to_string());
        }
        if self.max_concurrent_polls == 0 {
            return Err("max_concurrent_polls must be at least 1".to_string());
        }
        if self.query_max_memory.to_bytes() == 0 {
            return Err("query_max_memory must be greater than zero".to_string());
        }
        if self.kill_history_capacity == 0 {
            return Err("kill_history_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Execution policy used when the session does not choose one
    pub execution_policy: String,
    /// How long finished queries stay visible before eviction
    pub query_retention: Duration,
    /// Interval of the sweep removing expired queries
    pub retention_sweep_interval: Duration,
    /// Maximum number of queries dispatched concurrently
    pub max_concurrent_dispatch: usize,
    pub memory: MemoryManagerConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            execution_policy: "all-at-once".to_string(),
            query_retention: Duration::from_secs(15 * 60),
            retention_sweep_interval: Duration::from_secs(1),
            max_concurrent_dispatch: 64,
            memory: MemoryManagerConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CoordinatorConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution_policy.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "execution_policy must not be empty".to_string(),
            ));
        }
        if self.max_concurrent_dispatch == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_dispatch must be at least 1".to_string(),
            ));
        }
        if self.retention_sweep_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "retention_sweep_interval must be greater than zero".to_string(),
            ));
        }
        self.memory.validate().map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CoordinatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = CoordinatorConfig::from_json(
            r#"{
                "execution_policy": "phased",
                "memory": {
                    "query_max_memory": 1073741824,
                    "low_memory_killer_policy": "total-reservation-on-blocked-nodes"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.execution_policy, "phased");
        assert_eq!(config.memory.query_max_memory, DataSize::gigabytes(1));
        assert_eq!(
            config.memory.low_memory_killer_policy,
            LowMemoryKillerPolicy::TotalReservationOnBlockedNodes
        );
        assert_eq!(config.max_concurrent_dispatch, 64);
        assert_eq!(config.memory.stale_snapshot_max_age, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = CoordinatorConfig::default();
        config.memory.max_concurrent_polls = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            CoordinatorConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CoordinatorConfig::from_json(r#"{"memory": {"low_memory_killer_policy": "largest"}}"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
