// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query Coordinator - Central orchestration for query execution
//!
//! The [`QueryCoordinator`] is the entry point: it classifies statements,
//! hands them to the bound execution factory and tracks every query until
//! it is evicted.

pub mod query_coordinator;
pub mod query_id;
pub mod query_registry;
pub mod query_type;

pub use query_coordinator::{CoordinatorServices, QueryCoordinator};
pub use query_id::{QueryId, QueryIdGenerator};
pub use query_registry::QueryRegistry;
pub use query_type::{classify, data_definition_kinds, is_data_definition, QueryType};
