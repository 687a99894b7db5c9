// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction state management
//!
//! This module defines the transaction identity and lifecycle states.

use crate::ast::IsolationLevel;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn new() -> Self {
        TransactionId(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction is active and can perform operations
    Active,
    /// Transaction has been committed successfully
    Committed,
    /// Transaction has been rolled back
    RolledBack,
}

/// Snapshot of one transaction known to the transaction manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub id: TransactionId,
    pub isolation_level: IsolationLevel,
    pub read_only: bool,
    /// Auto-commit transactions are opened and closed by the coordinator
    /// around a single statement
    pub auto_commit: bool,
    pub status: TransactionStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TransactionInfo {
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }
}
