// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Stage scheduling
//!
//! A planned query is a [`StageGraph`]. The selected [`ExecutionPolicy`]
//! turns it into an [`ExecutionSchedule`] that releases stages to the
//! launcher. Policies only change the start order, never which stages run.

pub mod all_at_once;
pub mod phased;
pub mod policy;
pub mod stage_graph;

pub use all_at_once::AllAtOnceExecutionPolicy;
pub use phased::PhasedExecutionPolicy;
pub use policy::{ExecutionPolicy, ExecutionPolicyRegistry, ExecutionSchedule};
pub use stage_graph::{StageDescriptor, StageGraph, StageGraphError, StageId};
