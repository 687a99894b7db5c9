// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Transaction manager implementation
//!
//! The coordinator only drives transaction boundaries. What a transaction
//! protects is the business of the connectors behind the metadata service.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use super::state::{TransactionId, TransactionInfo, TransactionStatus};
use crate::ast::IsolationLevel;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Unknown transaction ID: {0}. Possibly expired? Commands ignored until end of transaction block")]
    UnknownTransaction(TransactionId),

    #[error("Transaction {0} is not active")]
    NotActive(TransactionId),

    #[error("Transaction {0} is read only")]
    ReadOnly(TransactionId),

    #[error("Transaction {id} failed: {message}")]
    Failed { id: TransactionId, message: String },
}

/// Owns the lifecycle of every transaction started by the coordinator
pub trait TransactionManager: Send + Sync {
    fn begin_transaction(
        &self,
        isolation_level: IsolationLevel,
        read_only: bool,
        auto_commit: bool,
    ) -> Result<TransactionId, TransactionError>;

    fn transaction_info(&self, id: TransactionId) -> Option<TransactionInfo>;

    fn commit(&self, id: TransactionId) -> Result<(), TransactionError>;

    fn rollback(&self, id: TransactionId) -> Result<(), TransactionError>;

    fn active_transactions(&self) -> Vec<TransactionInfo>;
}

/// Transaction manager that keeps transaction state in memory
pub struct InMemoryTransactionManager {
    /// Map of transactions by ID, active and finished
    transactions: RwLock<HashMap<TransactionId, TransactionInfo>>,
    /// Isolation level used when a statement does not choose one
    default_isolation_level: IsolationLevel,
}

impl Default for InMemoryTransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransactionManager {
    pub fn new() -> Self {
        Self {
            transactions: RwLock::new(HashMap::new()),
            default_isolation_level: IsolationLevel::ReadCommitted,
        }
    }

    pub fn default_isolation_level(&self) -> IsolationLevel {
        self.default_isolation_level
    }

    /// Transactions that have been committed or rolled back
    pub fn finished_transactions(&self) -> Vec<TransactionInfo> {
        self.transactions
            .read()
            .values()
            .filter(|info| !info.is_active())
            .cloned()
            .collect()
    }

    fn finish(&self, id: TransactionId, status: TransactionStatus) -> Result<(), TransactionError> {
        let mut transactions = self.transactions.write();
        let info = transactions
            .get_mut(&id)
            .ok_or(TransactionError::UnknownTransaction(id))?;
        if !info.is_active() {
            return Err(TransactionError::NotActive(id));
        }
        info.status = status;
        log::debug!("Transaction {} finished as {:?}", id, status);
        Ok(())
    }
}

impl TransactionManager for InMemoryTransactionManager {
    fn begin_transaction(
        &self,
        isolation_level: IsolationLevel,
        read_only: bool,
        auto_commit: bool,
    ) -> Result<TransactionId, TransactionError> {
        let id = TransactionId::new();
        let info = TransactionInfo {
            id,
            isolation_level,
            read_only,
            auto_commit,
            status: TransactionStatus::Active,
            created_at: chrono::Utc::now(),
        };
        self.transactions.write().insert(id, info);
        log::debug!(
            "BEGIN TRANSACTION {} - {} isolation level, {}{}",
            id,
            isolation_level.as_str(),
            if read_only { "READ ONLY" } else { "READ WRITE" },
            if auto_commit { ", auto-commit" } else { "" }
        );
        Ok(id)
    }

    fn transaction_info(&self, id: TransactionId) -> Option<TransactionInfo> {
        self.transactions.read().get(&id).cloned()
    }

    fn commit(&self, id: TransactionId) -> Result<(), TransactionError> {
        self.finish(id, TransactionStatus::Committed)
    }

    fn rollback(&self, id: TransactionId) -> Result<(), TransactionError> {
        self.finish(id, TransactionStatus::RolledBack)
    }

    fn active_transactions(&self) -> Vec<TransactionInfo> {
        self.transactions
            .read()
            .values()
            .filter(|info| info.is_active())
            .cloned()
            .collect()
    }
}
