// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Stagecoach - coordination core of a distributed SQL query engine
//!
//! Stagecoach sits between the SQL front end and the worker nodes. It takes
//! parsed statements and decides how each one runs.
//!
//! # Features
//!
//! - **Statement classification**: every statement kind maps to a query type
//! - **Data definition**: one task per DDL statement, run in the regular
//!   query lifecycle with auto-commit transactions
//! - **Execution policies**: `all-at-once` and `phased` stage scheduling
//! - **Cluster memory management**: periodic node polling, per-query limits
//!   and a pluggable low-memory killer
//!
//! # Usage
//!
//! Build a [`QueryCoordinator`] from a [`CoordinatorConfig`] and the external
//! collaborators ([`CoordinatorServices`]), then submit statements:
//!
//! ```ignore
//! let coordinator = QueryCoordinator::new(CoordinatorConfig::default(), services)?;
//! coordinator.start_background_tasks();
//! let query_id = coordinator.submit(session, statement, "CREATE MODEL c.m", vec![])?;
//! let info = coordinator.wait_for_completion(&query_id).await?;
//! ```

pub mod ast;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod exec;
pub mod memory;
pub mod scheduler;
pub mod session;
pub mod txn;

// Re-export the public API
pub use config::{ConfigError, CoordinatorConfig, MemoryManagerConfig};
pub use coordinator::{CoordinatorServices, QueryCoordinator, QueryId, QueryType};
pub use exec::{ExecutionError, QueryInfo, QueryPlanner, QueryState, StageLauncher};
pub use memory::{DataSize, LowMemoryKillerPolicy};
pub use session::{Session, SessionUpdate};

/// Stagecoach version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stagecoach crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
