// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session context for statement execution
//!
//! This module provides:
//! - The immutable [`Session`] snapshot and its builder
//! - [`SessionUpdate`] values returned by context-changing statements
//! - The table of system session properties

pub mod models;
pub mod properties;

pub use models::{Identity, Session, SessionBuilder, SessionUpdate};
pub use properties::{
    system_session_property, validate_system_property, PropertyType, SystemSessionProperty,
    EXECUTION_POLICY, QUERY_MAX_MEMORY, QUERY_PRIORITY, REDISTRIBUTE_WRITES,
};
