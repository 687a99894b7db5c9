//! Statement builders standing in for the SQL parser

use stagecoach::ast::*;

pub fn query(sql: &str) -> Statement {
    Statement::Query(Query {
        sql: sql.to_string(),
        location: Location::default(),
    })
}

pub fn create_model(name: &str) -> Statement {
    Statement::CreateModel(CreateModelStatement {
        model_name: QualifiedName::parse(name),
        location: Location::default(),
    })
}

pub fn delete_model(name: &str) -> Statement {
    Statement::DeleteModel(DeleteModelStatement {
        model_name: QualifiedName::parse(name),
        location: Location::default(),
    })
}

pub fn create_schema(name: &str) -> Statement {
    Statement::CreateSchema(CreateSchemaStatement {
        name: QualifiedName::parse(name),
        if_not_exists: false,
        location: Location::default(),
    })
}

pub fn use_schema(catalog: Option<&str>, schema: &str) -> Statement {
    Statement::Use(UseStatement {
        catalog: catalog.map(str::to_string),
        schema: schema.to_string(),
        location: Location::default(),
    })
}

pub fn set_session(name: &str, value: Expression) -> Statement {
    Statement::SetSession(SetSessionStatement {
        name: QualifiedName::parse(name),
        value,
        location: Location::default(),
    })
}

pub fn start_transaction(read_only: bool) -> Statement {
    Statement::StartTransaction(StartTransactionStatement {
        isolation_level: None,
        read_only: Some(read_only),
        location: Location::default(),
    })
}

pub fn commit() -> Statement {
    Statement::Commit(CommitStatement {
        location: Location::default(),
    })
}

pub fn rollback() -> Statement {
    Statement::Rollback(RollbackStatement {
        location: Location::default(),
    })
}

pub fn drop_schema(name: &str, if_exists: bool, cascade: bool) -> Statement {
    Statement::DropSchema(DropSchemaStatement {
        name: QualifiedName::parse(name),
        if_exists,
        cascade,
        location: Location::default(),
    })
}

pub fn create_table(name: &str, columns: &[&str], if_not_exists: bool) -> Statement {
    Statement::CreateTable(CreateTableStatement {
        name: QualifiedName::parse(name),
        columns: columns
            .iter()
            .map(|column| ColumnDefinition::new(*column, "varchar"))
            .collect(),
        if_not_exists,
        location: Location::default(),
    })
}

pub fn drop_table(name: &str, if_exists: bool) -> Statement {
    Statement::DropTable(DropTableStatement {
        name: QualifiedName::parse(name),
        if_exists,
        location: Location::default(),
    })
}

pub fn create_view(name: &str, sql: &str, replace: bool) -> Statement {
    Statement::CreateView(CreateViewStatement {
        name: QualifiedName::parse(name),
        query: Query {
            sql: sql.to_string(),
            location: Location::default(),
        },
        replace,
        location: Location::default(),
    })
}

pub fn grant(privileges: Option<Vec<Privilege>>, table: &str, grantee: &str) -> Statement {
    Statement::Grant(GrantStatement {
        privileges,
        table: QualifiedName::parse(table),
        grantee: grantee.to_string(),
        with_grant_option: false,
        location: Location::default(),
    })
}

pub fn revoke(privileges: Option<Vec<Privilege>>, table: &str, grantee: &str) -> Statement {
    Statement::Revoke(RevokeStatement {
        privileges,
        table: QualifiedName::parse(table),
        grantee: grantee.to_string(),
        grant_option_for: false,
        location: Location::default(),
    })
}

pub fn reset_session(name: &str) -> Statement {
    Statement::ResetSession(ResetSessionStatement {
        name: QualifiedName::parse(name),
        location: Location::default(),
    })
}

pub fn prepare(name: &str, statement: Statement) -> Statement {
    Statement::Prepare(PrepareStatement {
        name: name.to_string(),
        statement: Box::new(statement),
        location: Location::default(),
    })
}

pub fn deallocate(name: &str) -> Statement {
    Statement::Deallocate(DeallocateStatement {
        name: name.to_string(),
        location: Location::default(),
    })
}

pub fn rename_schema(source: &str, target: &str) -> Statement {
    Statement::RenameSchema(RenameSchemaStatement {
        source: QualifiedName::parse(source),
        target: target.to_string(),
        location: Location::default(),
    })
}

pub fn rename_table(source: &str, target: &str) -> Statement {
    Statement::RenameTable(RenameTableStatement {
        source: QualifiedName::parse(source),
        target: QualifiedName::parse(target),
        location: Location::default(),
    })
}

pub fn add_column(table: &str, column: &str) -> Statement {
    Statement::AddColumn(AddColumnStatement {
        table: QualifiedName::parse(table),
        column: ColumnDefinition::new(column, "varchar"),
        location: Location::default(),
    })
}

pub fn rename_column(table: &str, source: &str, target: &str) -> Statement {
    Statement::RenameColumn(RenameColumnStatement {
        table: QualifiedName::parse(table),
        source: source.to_string(),
        target: target.to_string(),
        location: Location::default(),
    })
}

pub fn drop_column(table: &str, column: &str) -> Statement {
    Statement::DropColumn(DropColumnStatement {
        table: QualifiedName::parse(table),
        column: column.to_string(),
        location: Location::default(),
    })
}

pub fn call(procedure: &str, arguments: Vec<Expression>) -> Statement {
    Statement::Call(CallStatement {
        name: QualifiedName::parse(procedure),
        arguments,
        location: Location::default(),
    })
}

pub fn set_path(path: &[&str]) -> Statement {
    Statement::SetPath(SetPathStatement {
        path: path.iter().map(|element| QualifiedName::parse(element)).collect(),
        location: Location::default(),
    })
}

pub fn show_columns(table: &str) -> Statement {
    Statement::ShowColumns(ShowColumnsStatement {
        table: QualifiedName::parse(table),
        location: Location::default(),
    })
}
