// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
pub mod ddl_stmt;
pub mod session_stmt;
pub mod statement_base;
pub mod transaction;

pub use ddl_stmt::DataDefinitionTaskRegistry;
pub use statement_base::{DataDefinitionTask, DdlContext, TaskOutcome};
