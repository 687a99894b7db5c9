// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Statement classification

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::ast::StatementKind;

/// Types of query operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    Select,
    Insert,
    Delete,
    Describe,
    Explain,
    DataDefinition,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Delete => "DELETE",
            QueryType::Describe => "DESCRIBE",
            QueryType::Explain => "EXPLAIN",
            QueryType::DataDefinition => "DATA_DEFINITION",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query type of a statement kind. Total over every kind.
pub fn classify(kind: StatementKind) -> QueryType {
    match kind {
        StatementKind::Query => QueryType::Select,
        StatementKind::Explain => QueryType::Explain,
        StatementKind::Insert | StatementKind::CreateTableAsSelect => QueryType::Insert,
        StatementKind::Delete => QueryType::Delete,
        StatementKind::ShowCatalogs
        | StatementKind::ShowSchemas
        | StatementKind::ShowTables
        | StatementKind::ShowModels
        | StatementKind::ShowSession
        | StatementKind::ShowCreate
        | StatementKind::ShowFunctions
        | StatementKind::ShowGrants
        | StatementKind::ShowPartitions
        | StatementKind::ShowStats
        | StatementKind::ShowColumns
        | StatementKind::DescribeInput
        | StatementKind::DescribeOutput => QueryType::Describe,
        StatementKind::CreateSchema
        | StatementKind::DropSchema
        | StatementKind::RenameSchema
        | StatementKind::CreateTable
        | StatementKind::DropTable
        | StatementKind::AddColumn
        | StatementKind::RenameTable
        | StatementKind::RenameColumn
        | StatementKind::DropColumn
        | StatementKind::CreateView
        | StatementKind::DropView
        | StatementKind::CreateModel
        | StatementKind::DeleteModel
        | StatementKind::Use
        | StatementKind::SetSession
        | StatementKind::ResetSession
        | StatementKind::StartTransaction
        | StatementKind::Commit
        | StatementKind::Rollback
        | StatementKind::Grant
        | StatementKind::Revoke
        | StatementKind::Prepare
        | StatementKind::Deallocate
        | StatementKind::Call
        | StatementKind::SetPath => QueryType::DataDefinition,
    }
}

pub fn is_data_definition(kind: StatementKind) -> bool {
    classify(kind) == QueryType::DataDefinition
}

/// Every statement kind classified as data definition
pub fn data_definition_kinds() -> BTreeSet<StatementKind> {
    StatementKind::ALL
        .iter()
        .copied()
        .filter(|kind| is_data_definition(*kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(classify(StatementKind::Query), QueryType::Select);
        assert_eq!(classify(StatementKind::CreateTableAsSelect), QueryType::Insert);
        assert_eq!(classify(StatementKind::ShowModels), QueryType::Describe);
        assert_eq!(classify(StatementKind::Explain), QueryType::Explain);
        assert_eq!(classify(StatementKind::CreateModel), QueryType::DataDefinition);
        assert_eq!(classify(StatementKind::DeleteModel), QueryType::DataDefinition);
        assert_eq!(classify(StatementKind::RenameColumn), QueryType::DataDefinition);
        assert_eq!(classify(StatementKind::SetPath), QueryType::DataDefinition);
        assert_eq!(classify(StatementKind::DescribeOutput), QueryType::Describe);
        assert_eq!(classify(StatementKind::ShowCreate), QueryType::Describe);
        assert!(!is_data_definition(StatementKind::Delete));
    }

    #[test]
    fn test_data_definition_kinds() {
        let kinds = data_definition_kinds();
        assert_eq!(kinds.len(), 25);
        assert!(kinds.contains(&StatementKind::Call));
        assert!(kinds.contains(&StatementKind::Use));
        assert!(kinds.contains(&StatementKind::Commit));
        assert!(!kinds.contains(&StatementKind::ShowSession));
        assert!(!kinds.contains(&StatementKind::ShowColumns));
    }
}
