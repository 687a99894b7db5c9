// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! SQL text reconstruction for AST nodes
//!
//! Used by EXPLAIN, audit logging and PREPARE. The output is canonical SQL,
//! not necessarily the text the client originally sent.

use crate::ast::ast::*;

/// Render a statement back to SQL text
pub fn format_statement(statement: &Statement) -> String {
    match statement {
        Statement::Query(query) => query.sql.clone(),
        Statement::Explain(explain) => {
            if explain.analyze {
                format!("EXPLAIN ANALYZE {}", format_statement(&explain.statement))
            } else {
                format!("EXPLAIN {}", format_statement(&explain.statement))
            }
        }
        Statement::Insert(insert) => {
            if insert.columns.is_empty() {
                format!("INSERT INTO {} {}", insert.target, insert.query.sql)
            } else {
                format!(
                    "INSERT INTO {} ({}) {}",
                    insert.target,
                    insert.columns.join(", "),
                    insert.query.sql
                )
            }
        }
        Statement::CreateTableAsSelect(ctas) => format!(
            "CREATE TABLE {}{} AS {}",
            if_not_exists(ctas.if_not_exists),
            ctas.name,
            ctas.query.sql
        ),
        Statement::Delete(delete) => match &delete.predicate {
            Some(predicate) => format!("DELETE FROM {} WHERE {}", delete.table, predicate),
            None => format!("DELETE FROM {}", delete.table),
        },
        Statement::ShowCatalogs(show) => with_like("SHOW CATALOGS".to_string(), &show.like_pattern),
        Statement::ShowSchemas(show) => {
            let base = match &show.catalog {
                Some(catalog) => format!("SHOW SCHEMAS FROM {}", catalog),
                None => "SHOW SCHEMAS".to_string(),
            };
            with_like(base, &show.like_pattern)
        }
        Statement::ShowTables(show) => {
            let base = match &show.schema {
                Some(schema) => format!("SHOW TABLES FROM {}", schema),
                None => "SHOW TABLES".to_string(),
            };
            with_like(base, &show.like_pattern)
        }
        Statement::ShowModels(show) => match &show.catalog {
            Some(catalog) => format!("SHOW MODELS FROM {}", catalog),
            None => "SHOW MODELS".to_string(),
        },
        Statement::ShowSession(_) => "SHOW SESSION".to_string(),
        Statement::ShowCreate(show) => match show.object_type {
            ShowCreateType::Table => format!("SHOW CREATE TABLE {}", show.name),
            ShowCreateType::View => format!("SHOW CREATE VIEW {}", show.name),
        },
        Statement::ShowFunctions(_) => "SHOW FUNCTIONS".to_string(),
        Statement::ShowGrants(show) => match &show.table {
            Some(table) => format!("SHOW GRANTS ON TABLE {}", table),
            None => "SHOW GRANTS".to_string(),
        },
        Statement::ShowPartitions(show) => format!("SHOW PARTITIONS FROM {}", show.table),
        Statement::ShowStats(show) => format!("SHOW STATS FOR {}", show.table),
        Statement::ShowColumns(show) => format!("SHOW COLUMNS FROM {}", show.table),
        Statement::DescribeInput(describe) => format!("DESCRIBE INPUT {}", describe.name),
        Statement::DescribeOutput(describe) => format!("DESCRIBE OUTPUT {}", describe.name),
        Statement::CreateSchema(create) => format!(
            "CREATE SCHEMA {}{}",
            if_not_exists(create.if_not_exists),
            create.name
        ),
        Statement::DropSchema(drop) => format!(
            "DROP SCHEMA {}{}{}",
            if_exists(drop.if_exists),
            drop.name,
            if drop.cascade { " CASCADE" } else { "" }
        ),
        Statement::RenameSchema(rename) => {
            format!("ALTER SCHEMA {} RENAME TO {}", rename.source, rename.target)
        }
        Statement::CreateTable(create) => {
            let columns = create
                .columns
                .iter()
                .map(format_column)
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "CREATE TABLE {}{} ({})",
                if_not_exists(create.if_not_exists),
                create.name,
                columns
            )
        }
        Statement::DropTable(drop) => {
            format!("DROP TABLE {}{}", if_exists(drop.if_exists), drop.name)
        }
        Statement::AddColumn(add) => format!(
            "ALTER TABLE {} ADD COLUMN {}",
            add.table,
            format_column(&add.column)
        ),
        Statement::RenameTable(rename) => {
            format!("ALTER TABLE {} RENAME TO {}", rename.source, rename.target)
        }
        Statement::RenameColumn(rename) => format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            rename.table, rename.source, rename.target
        ),
        Statement::DropColumn(drop) => {
            format!("ALTER TABLE {} DROP COLUMN {}", drop.table, drop.column)
        }
        Statement::CreateView(create) => format!(
            "CREATE {}VIEW {} AS {}",
            if create.replace { "OR REPLACE " } else { "" },
            create.name,
            create.query.sql
        ),
        Statement::DropView(drop) => {
            format!("DROP VIEW {}{}", if_exists(drop.if_exists), drop.name)
        }
        Statement::CreateModel(create) => format!("CREATE MODEL {}", create.model_name),
        Statement::DeleteModel(delete) => format!("DELETE MODEL {}", delete.model_name),
        Statement::Use(use_stmt) => match &use_stmt.catalog {
            Some(catalog) => format!("USE {}.{}", catalog, use_stmt.schema),
            None => format!("USE {}", use_stmt.schema),
        },
        Statement::SetSession(set) => format!("SET SESSION {} = {}", set.name, set.value),
        Statement::ResetSession(reset) => format!("RESET SESSION {}", reset.name),
        Statement::StartTransaction(start) => {
            let mut modes = Vec::new();
            if let Some(level) = start.isolation_level {
                modes.push(format!("ISOLATION LEVEL {}", level.as_str()));
            }
            match start.read_only {
                Some(true) => modes.push("READ ONLY".to_string()),
                Some(false) => modes.push("READ WRITE".to_string()),
                None => {}
            }
            if modes.is_empty() {
                "START TRANSACTION".to_string()
            } else {
                format!("START TRANSACTION {}", modes.join(", "))
            }
        }
        Statement::Commit(_) => "COMMIT".to_string(),
        Statement::Rollback(_) => "ROLLBACK".to_string(),
        Statement::Grant(grant) => format!(
            "GRANT {} ON {} TO {}{}",
            format_privileges(&grant.privileges),
            grant.table,
            grant.grantee,
            if grant.with_grant_option {
                " WITH GRANT OPTION"
            } else {
                ""
            }
        ),
        Statement::Revoke(revoke) => format!(
            "REVOKE {}{} ON {} FROM {}",
            if revoke.grant_option_for {
                "GRANT OPTION FOR "
            } else {
                ""
            },
            format_privileges(&revoke.privileges),
            revoke.table,
            revoke.grantee
        ),
        Statement::Prepare(prepare) => format!(
            "PREPARE {} FROM {}",
            prepare.name,
            format_statement(&prepare.statement)
        ),
        Statement::Deallocate(deallocate) => format!("DEALLOCATE PREPARE {}", deallocate.name),
        Statement::Call(call) => format!(
            "CALL {}({})",
            call.name,
            call.arguments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Statement::SetPath(set) => format!(
            "SET PATH {}",
            set.path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn format_column(column: &ColumnDefinition) -> String {
    if column.nullable {
        format!("{} {}", column.name, column.data_type)
    } else {
        format!("{} {} NOT NULL", column.name, column.data_type)
    }
}

fn if_not_exists(flag: bool) -> &'static str {
    if flag {
        "IF NOT EXISTS "
    } else {
        ""
    }
}

fn if_exists(flag: bool) -> &'static str {
    if flag {
        "IF EXISTS "
    } else {
        ""
    }
}

fn with_like(base: String, pattern: &Option<String>) -> String {
    match pattern {
        Some(pattern) => format!("{} LIKE '{}'", base, pattern),
        None => base,
    }
}

fn format_privileges(privileges: &Option<Vec<Privilege>>) -> String {
    match privileges {
        Some(list) => list
            .iter()
            .map(Privilege::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        None => "ALL PRIVILEGES".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_model_statements() {
        let create = Statement::CreateModel(CreateModelStatement {
            model_name: QualifiedName::parse("catalog1.model1"),
            location: Location::default(),
        });
        assert_eq!(format_statement(&create), "CREATE MODEL catalog1.model1");

        let delete = Statement::DeleteModel(DeleteModelStatement {
            model_name: QualifiedName::parse("catalog1.model1"),
            location: Location::default(),
        });
        assert_eq!(format_statement(&delete), "DELETE MODEL catalog1.model1");
    }

    #[test]
    fn test_format_create_table() {
        let create = Statement::CreateTable(CreateTableStatement {
            name: QualifiedName::parse("hive.web.clicks"),
            columns: vec![
                ColumnDefinition::new("id", "bigint"),
                ColumnDefinition {
                    name: "url".into(),
                    data_type: "varchar".into(),
                    nullable: false,
                },
            ],
            if_not_exists: true,
            location: Location::default(),
        });
        assert_eq!(
            format_statement(&create),
            "CREATE TABLE IF NOT EXISTS hive.web.clicks (id bigint, url varchar NOT NULL)"
        );
    }

    #[test]
    fn test_format_alter_statements() {
        let add = Statement::AddColumn(AddColumnStatement {
            table: QualifiedName::parse("hive.web.clicks"),
            column: ColumnDefinition::new("referrer", "varchar"),
            location: Location::default(),
        });
        assert_eq!(
            format_statement(&add),
            "ALTER TABLE hive.web.clicks ADD COLUMN referrer varchar"
        );

        let rename = Statement::RenameColumn(RenameColumnStatement {
            table: QualifiedName::parse("clicks"),
            source: "url".into(),
            target: "link".into(),
            location: Location::default(),
        });
        assert_eq!(
            format_statement(&rename),
            "ALTER TABLE clicks RENAME COLUMN url TO link"
        );

        let call = Statement::Call(CallStatement {
            name: QualifiedName::parse("system.runtime.kill_query"),
            arguments: vec![Expression::StringLiteral("q1".into()), Expression::Parameter(0)],
            location: Location::default(),
        });
        assert_eq!(
            format_statement(&call),
            "CALL system.runtime.kill_query('q1', ?)"
        );
    }

    #[test]
    fn test_format_transaction_and_grants() {
        let start = Statement::StartTransaction(StartTransactionStatement {
            isolation_level: Some(IsolationLevel::Serializable),
            read_only: Some(true),
            location: Location::default(),
        });
        assert_eq!(
            format_statement(&start),
            "START TRANSACTION ISOLATION LEVEL SERIALIZABLE, READ ONLY"
        );

        let grant = Statement::Grant(GrantStatement {
            privileges: None,
            table: QualifiedName::parse("hive.web.clicks"),
            grantee: "analyst".into(),
            with_grant_option: true,
            location: Location::default(),
        });
        assert_eq!(
            format_statement(&grant),
            "GRANT ALL PRIVILEGES ON hive.web.clicks TO analyst WITH GRANT OPTION"
        );
    }
}
