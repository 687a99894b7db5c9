// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution
//!
//! This module provides the per-query lifecycle ([`QueryExecution`]), the
//! factories creating executions for each statement kind and the
//! data-definition tasks.

pub mod ddl_execution;
pub mod error;
pub mod execution;
pub mod factory_registry;
pub mod query_state;
pub mod sql_execution;
pub mod write_stmt;

// Re-export the main types for convenience
pub use ddl_execution::{DataDefinitionExecution, DataDefinitionExecutionFactory};
pub use error::{ErrorType, ExecutionError, SemanticErrorCode};
pub use execution::{QueryExecution, QueryExecutionFactory, QueryInfo, QueryRequest};
pub use factory_registry::QueryExecutionFactoryRegistry;
pub use query_state::{QueryState, QueryStateMachine};
pub use sql_execution::{QueryPlanner, SqlQueryExecution, SqlQueryExecutionFactory, StageLauncher};
pub use write_stmt::{DataDefinitionTask, DataDefinitionTaskRegistry, DdlContext, TaskOutcome};
