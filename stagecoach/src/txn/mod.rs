// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction management module
//!
//! Data-definition statements run inside a transaction obtained from the
//! [`TransactionManager`]. A session has at most one active transaction.
//!
//! # Features
//! - Transaction lifecycle management (START TRANSACTION, COMMIT, ROLLBACK)
//! - Auto-commit transactions opened around single statements
//! - Isolation level and access mode tracking

pub mod manager;
pub mod state;

pub use manager::{InMemoryTransactionManager, TransactionError, TransactionManager};
pub use state::{TransactionId, TransactionInfo, TransactionStatus};
