// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
use crate::ast::{Expression, QualifiedName, Statement, StatementKind};
use crate::ast::format_statement;
use crate::catalog::{AccessControl, CatalogSchemaName, Metadata, QualifiedObjectName};
use crate::exec::error::SemanticErrorCode;
use crate::exec::ExecutionError;
use crate::session::{Session, SessionUpdate};
use crate::txn::{TransactionId, TransactionManager};

/// Collaborators and inputs available to a data-definition task
pub struct DdlContext<'a> {
    pub session: &'a Session,
    pub parameters: &'a [Expression],
    pub metadata: &'a dyn Metadata,
    pub access_control: &'a dyn AccessControl,
    pub transaction_manager: &'a dyn TransactionManager,
    /// Transaction the task runs in, explicit or auto-commit
    pub transaction_id: Option<TransactionId>,
}

/// Result of a successful task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOutcome {
    pub updates: Vec<SessionUpdate>,
}

impl TaskOutcome {
    pub fn done() -> Self {
        Self::default()
    }

    pub fn with_update(update: SessionUpdate) -> Self {
        Self {
            updates: vec![update],
        }
    }

    pub fn with_updates(updates: Vec<SessionUpdate>) -> Self {
        Self { updates }
    }
}

/// Base trait for every data-definition task
///
/// Tasks are stateless. Each one validates the statement, consults access
/// control and then performs at most one metadata mutation. Transaction
/// boundaries belong to the caller except for the transaction statements.
pub trait DataDefinitionTask: Send + Sync {
    /// Human readable name, e.g. "CREATE MODEL"
    fn name(&self) -> &'static str;

    /// Statement kind this task executes
    fn kind(&self) -> StatementKind;

    /// Execute the operation
    fn execute_task(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError>;

    /// Describe the operation without touching metadata
    fn explain(&self, statement: &Statement, _parameters: &[Expression]) -> String {
        format_statement(statement)
    }

    /// Check if this statement mutates metadata
    fn requires_write_permission(&self) -> bool {
        true
    }

    /// Main execution method - handles the complete task flow
    fn execute(
        &self,
        statement: &Statement,
        context: &DdlContext<'_>,
    ) -> Result<TaskOutcome, ExecutionError> {
        if statement.kind() != self.kind() {
            return Err(unexpected_statement(self.name(), statement));
        }

        self.pre_execute(context)?;
        let outcome = self.execute_task(statement, context)?;
        log::debug!("{} succeeded for user {}", self.name(), context.session.user());
        Ok(outcome)
    }

    /// Pre-execution: writes are rejected inside read-only transactions
    fn pre_execute(&self, context: &DdlContext<'_>) -> Result<(), ExecutionError> {
        if !self.requires_write_permission() {
            return Ok(());
        }
        if let Some(id) = context.transaction_id {
            let info = context
                .transaction_manager
                .transaction_info(id)
                .ok_or(crate::txn::TransactionError::UnknownTransaction(id))?;
            if info.read_only {
                return Err(crate::txn::TransactionError::ReadOnly(id).into());
            }
        }
        Ok(())
    }
}

/// Error for a statement routed to the wrong task
pub fn unexpected_statement(task_name: &str, statement: &Statement) -> ExecutionError {
    ExecutionError::Internal(format!(
        "{} task cannot execute {} statement",
        task_name,
        statement.kind()
    ))
}

/// Resolve a `[[catalog.]schema.]object` name against the session defaults
pub fn create_qualified_object_name(
    session: &Session,
    statement: &Statement,
    name: &QualifiedName,
) -> Result<QualifiedObjectName, ExecutionError> {
    let parts = name.parts();
    match parts {
        [object] => {
            let catalog = require_session_catalog(session, statement)?;
            let schema = session.schema.clone().ok_or_else(|| {
                ExecutionError::semantic(
                    SemanticErrorCode::MissingSchema,
                    statement,
                    "Schema must be specified when session schema is not set",
                )
            })?;
            Ok(QualifiedObjectName::new(catalog, schema, object.clone()))
        }
        [schema, object] => {
            let catalog = require_session_catalog(session, statement)?;
            Ok(QualifiedObjectName::new(catalog, schema.clone(), object.clone()))
        }
        [catalog, schema, object] => Ok(QualifiedObjectName::new(
            catalog.clone(),
            schema.clone(),
            object.clone(),
        )),
        _ => Err(ExecutionError::semantic(
            SemanticErrorCode::InvalidName,
            statement,
            format!("Too many dots in table name: {}", name),
        )),
    }
}

/// Resolve a `[catalog.]schema` name against the session catalog
pub fn create_catalog_schema_name(
    session: &Session,
    statement: &Statement,
    name: &QualifiedName,
) -> Result<CatalogSchemaName, ExecutionError> {
    match name.parts() {
        [schema] => {
            let catalog = require_session_catalog(session, statement)?;
            Ok(CatalogSchemaName::new(catalog, schema.clone()))
        }
        [catalog, schema] => Ok(CatalogSchemaName::new(catalog.clone(), schema.clone())),
        _ => Err(ExecutionError::semantic(
            SemanticErrorCode::InvalidName,
            statement,
            format!("Too many parts in schema name: {}", name),
        )),
    }
}

/// Split a model name into `(catalog, model)`. Exactly two parts are required.
pub fn create_model_name(
    statement: &Statement,
    name: &QualifiedName,
) -> Result<(String, String), ExecutionError> {
    let problem = match name.parts() {
        [catalog, model] => return Ok((catalog.clone(), model.clone())),
        parts if parts.len() > 2 => "Too many",
        _ => "Too few",
    };
    Err(ExecutionError::semantic(
        SemanticErrorCode::InvalidModelName,
        statement,
        format!("{} parts in model name: {}", problem, name),
    ))
}

/// Fail with a semantic error unless `catalog` is known to the metadata
pub fn require_catalog(
    context: &DdlContext<'_>,
    statement: &Statement,
    catalog: &str,
) -> Result<(), ExecutionError> {
    if context.metadata.catalog_exists(context.session, catalog) {
        Ok(())
    } else {
        Err(ExecutionError::semantic(
            SemanticErrorCode::CatalogNotFound,
            statement,
            format!("Catalog {} does not exist", catalog),
        ))
    }
}

fn require_session_catalog(session: &Session, statement: &Statement) -> Result<String, ExecutionError> {
    session.catalog.clone().ok_or_else(|| {
        ExecutionError::semantic(
            SemanticErrorCode::MissingCatalog,
            statement,
            "Catalog must be specified when session catalog is not set",
        )
    })
}

/// Resolve a literal or `?` parameter to its literal value
pub fn resolve_expression<'e>(
    statement: &Statement,
    expression: &'e Expression,
    parameters: &'e [Expression],
) -> Result<&'e Expression, ExecutionError> {
    match expression {
        Expression::Parameter(index) => match parameters.get(*index) {
            Some(Expression::Parameter(_)) => Err(ExecutionError::semantic(
                SemanticErrorCode::InvalidParameter,
                statement,
                "Parameter values must be literals",
            )),
            Some(value) => Ok(value),
            None => Err(ExecutionError::semantic(
                SemanticErrorCode::InvalidParameter,
                statement,
                format!(
                    "Incorrect number of parameters: expected at least {} but found {}",
                    index + 1,
                    parameters.len()
                ),
            )),
        },
        literal => Ok(literal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CreateModelStatement, Location};

    fn statement() -> Statement {
        Statement::CreateModel(CreateModelStatement {
            model_name: QualifiedName::parse("m"),
            location: Location::default(),
        })
    }

    #[test]
    fn test_object_name_uses_session_defaults() {
        let session = Session::builder("alice").catalog("hive").schema("web").build();
        let name = create_qualified_object_name(&session, &statement(), &QualifiedName::parse("t"))
            .unwrap();
        assert_eq!(name, QualifiedObjectName::new("hive", "web", "t"));

        let name =
            create_qualified_object_name(&session, &statement(), &QualifiedName::parse("s.t"))
                .unwrap();
        assert_eq!(name, QualifiedObjectName::new("hive", "s", "t"));
    }

    #[test]
    fn test_object_name_errors() {
        let session = Session::builder("alice").build();
        let err = create_qualified_object_name(&session, &statement(), &QualifiedName::parse("t"))
            .unwrap_err();
        assert_eq!(err.semantic_code(), Some(SemanticErrorCode::MissingCatalog));

        let err =
            create_qualified_object_name(&session, &statement(), &QualifiedName::parse("a.b.c.d"))
                .unwrap_err();
        assert_eq!(err.semantic_code(), Some(SemanticErrorCode::InvalidName));
    }

    #[test]
    fn test_model_name_requires_two_parts() {
        assert_eq!(
            create_model_name(&statement(), &QualifiedName::parse("catalog1.model1")).unwrap(),
            ("catalog1".to_string(), "model1".to_string())
        );

        let err = create_model_name(&statement(), &QualifiedName::parse("model1")).unwrap_err();
        assert_eq!(err.semantic_code(), Some(SemanticErrorCode::InvalidModelName));
        assert_eq!(err.to_string(), "Too few parts in model name: model1");

        let err = create_model_name(&statement(), &QualifiedName::parse("a.b.c")).unwrap_err();
        assert_eq!(err.semantic_code(), Some(SemanticErrorCode::InvalidModelName));
        assert_eq!(err.to_string(), "Too many parts in model name: a.b.c");
    }

    #[test]
    fn test_resolve_parameter() {
        let params = vec![Expression::LongLiteral(7)];
        assert_eq!(
            resolve_expression(&statement(), &Expression::Parameter(0), &params).unwrap(),
            &Expression::LongLiteral(7)
        );
        let err = resolve_expression(&statement(), &Expression::Parameter(1), &params).unwrap_err();
        assert_eq!(err.semantic_code(), Some(SemanticErrorCode::InvalidParameter));
    }
}
