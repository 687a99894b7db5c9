// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
pub mod commit;
pub mod rollback;
pub mod start;
pub mod transaction_base;

pub use commit::CommitTask;
pub use rollback::RollbackTask;
pub use start::StartTransactionTask;
