// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Abstract Syntax Tree (AST) structures for parsed SQL statements
//!
//! Statements arrive from the parser fully built and are never mutated
//! afterwards. Each variant carries only the fields needed to execute it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location information for AST nodes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Dotted, possibly partial, object name such as `catalog.schema.table`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    parts: Vec<String>,
}

impl QualifiedName {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a dotted name. Empty input yields an empty name.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self { parts: Vec::new() };
        }
        Self::new(dotted.split('.'))
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Last part of the name
    pub fn suffix(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Everything but the last part
    pub fn prefix(&self) -> Option<QualifiedName> {
        if self.parts.len() < 2 {
            return None;
        }
        Some(Self {
            parts: self.parts[..self.parts.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

/// Literal-only expressions. Statement arguments never reference columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Expression {
    StringLiteral(String),
    LongLiteral(i64),
    DoubleLiteral(f64),
    BooleanLiteral(bool),
    NullLiteral,
    /// Positional `?` placeholder, zero-based
    Parameter(usize),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::StringLiteral(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Expression::LongLiteral(value) => write!(f, "{}", value),
            Expression::DoubleLiteral(value) => write!(f, "{:?}", value),
            Expression::BooleanLiteral(value) => {
                write!(f, "{}", if *value { "true" } else { "false" })
            }
            Expression::NullLiteral => write!(f, "null"),
            Expression::Parameter(_) => write!(f, "?"),
        }
    }
}

/// Opaque body of a query. Planning of the body happens outside the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub sql: String,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainStatement {
    pub statement: Box<Statement>,
    pub analyze: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsertStatement {
    pub target: QualifiedName,
    pub columns: Vec<String>,
    pub query: Query,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTableAsSelectStatement {
    pub name: QualifiedName,
    pub query: Query,
    pub if_not_exists: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteStatement {
    pub table: QualifiedName,
    pub predicate: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowCatalogsStatement {
    pub like_pattern: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowSchemasStatement {
    pub catalog: Option<String>,
    pub like_pattern: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowTablesStatement {
    pub schema: Option<QualifiedName>,
    pub like_pattern: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowModelsStatement {
    pub catalog: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowSessionStatement {
    pub location: Location,
}

/// Object kind named by SHOW CREATE
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShowCreateType {
    Table,
    View,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowCreateStatement {
    pub object_type: ShowCreateType,
    pub name: QualifiedName,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowFunctionsStatement {
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowGrantsStatement {
    pub table: Option<QualifiedName>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowPartitionsStatement {
    pub table: QualifiedName,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowStatsStatement {
    pub table: QualifiedName,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowColumnsStatement {
    pub table: QualifiedName,
    pub location: Location,
}

/// `DESCRIBE INPUT name` of a prepared statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DescribeInputStatement {
    pub name: String,
    pub location: Location,
}

/// `DESCRIBE OUTPUT name` of a prepared statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DescribeOutputStatement {
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSchemaStatement {
    pub name: QualifiedName,
    pub if_not_exists: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DropSchemaStatement {
    pub name: QualifiedName,
    pub if_exists: bool,
    pub cascade: bool,
    pub location: Location,
}

/// `ALTER SCHEMA source RENAME TO target`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenameSchemaStatement {
    pub source: QualifiedName,
    /// Always lands in the catalog of the source
    pub target: String,
    pub location: Location,
}

/// Column definition of CREATE TABLE and ADD COLUMN
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTableStatement {
    pub name: QualifiedName,
    pub columns: Vec<ColumnDefinition>,
    pub if_not_exists: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DropTableStatement {
    pub name: QualifiedName,
    pub if_exists: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddColumnStatement {
    pub table: QualifiedName,
    pub column: ColumnDefinition,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenameTableStatement {
    pub source: QualifiedName,
    pub target: QualifiedName,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenameColumnStatement {
    pub table: QualifiedName,
    pub source: String,
    pub target: String,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DropColumnStatement {
    pub table: QualifiedName,
    pub column: String,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateViewStatement {
    pub name: QualifiedName,
    pub query: Query,
    pub replace: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DropViewStatement {
    pub name: QualifiedName,
    pub if_exists: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateModelStatement {
    pub model_name: QualifiedName,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteModelStatement {
    pub model_name: QualifiedName,
    pub location: Location,
}

/// `USE [catalog.]schema`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UseStatement {
    pub catalog: Option<String>,
    pub schema: String,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetSessionStatement {
    pub name: QualifiedName,
    pub value: Expression,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetSessionStatement {
    pub name: QualifiedName,
    pub location: Location,
}

/// `CALL procedure(args)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallStatement {
    pub name: QualifiedName,
    pub arguments: Vec<Expression>,
    pub location: Location,
}

/// `SET PATH` with `[catalog.]schema` elements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetPathStatement {
    pub path: Vec<QualifiedName>,
    pub location: Location,
}

/// Transaction isolation levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartTransactionStatement {
    pub isolation_level: Option<IsolationLevel>,
    pub read_only: Option<bool>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitStatement {
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollbackStatement {
    pub location: Location,
}

/// Table privilege names accepted by GRANT and REVOKE
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Privilege {
    Select,
    Insert,
    Delete,
    Update,
}

impl Privilege {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::Select => "SELECT",
            Privilege::Insert => "INSERT",
            Privilege::Delete => "DELETE",
            Privilege::Update => "UPDATE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrantStatement {
    /// `None` means ALL PRIVILEGES
    pub privileges: Option<Vec<Privilege>>,
    pub table: QualifiedName,
    pub grantee: String,
    pub with_grant_option: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevokeStatement {
    /// `None` means ALL PRIVILEGES
    pub privileges: Option<Vec<Privilege>>,
    pub table: QualifiedName,
    pub grantee: String,
    pub grant_option_for: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrepareStatement {
    pub name: String,
    pub statement: Box<Statement>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeallocateStatement {
    pub name: String,
    pub location: Location,
}

/// Top-level statement types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Statement {
    Query(Query),
    Explain(ExplainStatement),
    Insert(InsertStatement),
    CreateTableAsSelect(CreateTableAsSelectStatement),
    Delete(DeleteStatement),
    ShowCatalogs(ShowCatalogsStatement),
    ShowSchemas(ShowSchemasStatement),
    ShowTables(ShowTablesStatement),
    ShowModels(ShowModelsStatement),
    ShowSession(ShowSessionStatement),
    ShowCreate(ShowCreateStatement),
    ShowFunctions(ShowFunctionsStatement),
    ShowGrants(ShowGrantsStatement),
    ShowPartitions(ShowPartitionsStatement),
    ShowStats(ShowStatsStatement),
    ShowColumns(ShowColumnsStatement),
    DescribeInput(DescribeInputStatement),
    DescribeOutput(DescribeOutputStatement),
    CreateSchema(CreateSchemaStatement),
    DropSchema(DropSchemaStatement),
    RenameSchema(RenameSchemaStatement),
    CreateTable(CreateTableStatement),
    DropTable(DropTableStatement),
    AddColumn(AddColumnStatement),
    RenameTable(RenameTableStatement),
    RenameColumn(RenameColumnStatement),
    DropColumn(DropColumnStatement),
    CreateView(CreateViewStatement),
    DropView(DropViewStatement),
    CreateModel(CreateModelStatement),
    DeleteModel(DeleteModelStatement),
    Use(UseStatement),
    SetSession(SetSessionStatement),
    ResetSession(ResetSessionStatement),
    StartTransaction(StartTransactionStatement),
    Commit(CommitStatement),
    Rollback(RollbackStatement),
    Grant(GrantStatement),
    Revoke(RevokeStatement),
    Prepare(PrepareStatement),
    Deallocate(DeallocateStatement),
    Call(CallStatement),
    SetPath(SetPathStatement),
}

/// Runtime kind of a [`Statement`], used as the key of every dispatch table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatementKind {
    Query,
    Explain,
    Insert,
    CreateTableAsSelect,
    Delete,
    ShowCatalogs,
    ShowSchemas,
    ShowTables,
    ShowModels,
    ShowSession,
    ShowCreate,
    ShowFunctions,
    ShowGrants,
    ShowPartitions,
    ShowStats,
    ShowColumns,
    DescribeInput,
    DescribeOutput,
    CreateSchema,
    DropSchema,
    RenameSchema,
    CreateTable,
    DropTable,
    AddColumn,
    RenameTable,
    RenameColumn,
    DropColumn,
    CreateView,
    DropView,
    CreateModel,
    DeleteModel,
    Use,
    SetSession,
    ResetSession,
    StartTransaction,
    Commit,
    Rollback,
    Grant,
    Revoke,
    Prepare,
    Deallocate,
    Call,
    SetPath,
}

impl StatementKind {
    /// Every recognized statement kind
    pub const ALL: [StatementKind; 43] = [
        StatementKind::Query,
        StatementKind::Explain,
        StatementKind::Insert,
        StatementKind::CreateTableAsSelect,
        StatementKind::Delete,
        StatementKind::ShowCatalogs,
        StatementKind::ShowSchemas,
        StatementKind::ShowTables,
        StatementKind::ShowModels,
        StatementKind::ShowSession,
        StatementKind::ShowCreate,
        StatementKind::ShowFunctions,
        StatementKind::ShowGrants,
        StatementKind::ShowPartitions,
        StatementKind::ShowStats,
        StatementKind::ShowColumns,
        StatementKind::DescribeInput,
        StatementKind::DescribeOutput,
        StatementKind::CreateSchema,
        StatementKind::DropSchema,
        StatementKind::RenameSchema,
        StatementKind::CreateTable,
        StatementKind::DropTable,
        StatementKind::AddColumn,
        StatementKind::RenameTable,
        StatementKind::RenameColumn,
        StatementKind::DropColumn,
        StatementKind::CreateView,
        StatementKind::DropView,
        StatementKind::CreateModel,
        StatementKind::DeleteModel,
        StatementKind::Use,
        StatementKind::SetSession,
        StatementKind::ResetSession,
        StatementKind::StartTransaction,
        StatementKind::Commit,
        StatementKind::Rollback,
        StatementKind::Grant,
        StatementKind::Revoke,
        StatementKind::Prepare,
        StatementKind::Deallocate,
        StatementKind::Call,
        StatementKind::SetPath,
    ];

    pub fn is_transaction_control(&self) -> bool {
        matches!(
            self,
            StatementKind::StartTransaction | StatementKind::Commit | StatementKind::Rollback
        )
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Query(_) => StatementKind::Query,
            Statement::Explain(_) => StatementKind::Explain,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::CreateTableAsSelect(_) => StatementKind::CreateTableAsSelect,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::ShowCatalogs(_) => StatementKind::ShowCatalogs,
            Statement::ShowSchemas(_) => StatementKind::ShowSchemas,
            Statement::ShowTables(_) => StatementKind::ShowTables,
            Statement::ShowModels(_) => StatementKind::ShowModels,
            Statement::ShowSession(_) => StatementKind::ShowSession,
            Statement::ShowCreate(_) => StatementKind::ShowCreate,
            Statement::ShowFunctions(_) => StatementKind::ShowFunctions,
            Statement::ShowGrants(_) => StatementKind::ShowGrants,
            Statement::ShowPartitions(_) => StatementKind::ShowPartitions,
            Statement::ShowStats(_) => StatementKind::ShowStats,
            Statement::ShowColumns(_) => StatementKind::ShowColumns,
            Statement::DescribeInput(_) => StatementKind::DescribeInput,
            Statement::DescribeOutput(_) => StatementKind::DescribeOutput,
            Statement::CreateSchema(_) => StatementKind::CreateSchema,
            Statement::DropSchema(_) => StatementKind::DropSchema,
            Statement::RenameSchema(_) => StatementKind::RenameSchema,
            Statement::CreateTable(_) => StatementKind::CreateTable,
            Statement::DropTable(_) => StatementKind::DropTable,
            Statement::AddColumn(_) => StatementKind::AddColumn,
            Statement::RenameTable(_) => StatementKind::RenameTable,
            Statement::RenameColumn(_) => StatementKind::RenameColumn,
            Statement::DropColumn(_) => StatementKind::DropColumn,
            Statement::CreateView(_) => StatementKind::CreateView,
            Statement::DropView(_) => StatementKind::DropView,
            Statement::CreateModel(_) => StatementKind::CreateModel,
            Statement::DeleteModel(_) => StatementKind::DeleteModel,
            Statement::Use(_) => StatementKind::Use,
            Statement::SetSession(_) => StatementKind::SetSession,
            Statement::ResetSession(_) => StatementKind::ResetSession,
            Statement::StartTransaction(_) => StatementKind::StartTransaction,
            Statement::Commit(_) => StatementKind::Commit,
            Statement::Rollback(_) => StatementKind::Rollback,
            Statement::Grant(_) => StatementKind::Grant,
            Statement::Revoke(_) => StatementKind::Revoke,
            Statement::Prepare(_) => StatementKind::Prepare,
            Statement::Deallocate(_) => StatementKind::Deallocate,
            Statement::Call(_) => StatementKind::Call,
            Statement::SetPath(_) => StatementKind::SetPath,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_qualified_name_parts() {
        let name = QualifiedName::parse("catalog1.model1");
        assert_eq!(name.len(), 2);
        assert_eq!(name.suffix(), Some("model1"));
        assert_eq!(name.prefix(), Some(QualifiedName::new(["catalog1"])));
        assert_eq!(name.to_string(), "catalog1.model1");

        assert!(QualifiedName::parse("").is_empty());
        assert_eq!(QualifiedName::parse("model1").prefix(), None);
    }

    #[test]
    fn test_statement_kind_table_has_no_duplicates() {
        let unique: HashSet<_> = StatementKind::ALL.iter().collect();
        assert_eq!(unique.len(), StatementKind::ALL.len());
    }

    #[test]
    fn test_statement_reports_its_kind() {
        let statement = Statement::CreateModel(CreateModelStatement {
            model_name: QualifiedName::parse("c.m"),
            location: Location::default(),
        });
        assert_eq!(statement.kind(), StatementKind::CreateModel);
        assert!(StatementKind::Commit.is_transaction_control());
        assert!(!StatementKind::CreateModel.is_transaction_control());
    }

    #[test]
    fn test_expression_display() {
        assert_eq!(Expression::StringLiteral("it's".into()).to_string(), "'it''s'");
        assert_eq!(Expression::LongLiteral(42).to_string(), "42");
        assert_eq!(Expression::BooleanLiteral(true).to_string(), "true");
        assert_eq!(Expression::Parameter(0).to_string(), "?");
    }
}
