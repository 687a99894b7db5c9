// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Statements that only change the client session context

pub mod deallocate;
pub mod prepare;
pub mod reset_session;
pub mod set_path;
pub mod set_session;
pub mod use_schema;

pub use deallocate::DeallocateTask;
pub use prepare::PrepareTask;
pub use reset_session::ResetSessionTask;
pub use set_path::SetPathTask;
pub use set_session::SetSessionTask;
pub use use_schema::UseTask;
