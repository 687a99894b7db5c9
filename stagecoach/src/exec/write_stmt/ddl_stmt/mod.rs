// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
pub mod add_column;
pub mod call;
pub mod create_model;
pub mod create_schema;
pub mod create_table;
pub mod create_view;
pub mod delete_model;
pub mod drop_column;
pub mod drop_schema;
pub mod drop_table;
pub mod drop_view;
pub mod grant;
pub mod rename_column;
pub mod rename_schema;
pub mod rename_table;
pub mod revoke;
pub mod task_registry;

pub use add_column::AddColumnTask;
pub use call::CallTask;
pub use create_model::CreateModelTask;
pub use create_schema::CreateSchemaTask;
pub use create_table::CreateTableTask;
pub use create_view::CreateViewTask;
pub use delete_model::DeleteModelTask;
pub use drop_column::DropColumnTask;
pub use drop_schema::DropSchemaTask;
pub use drop_table::DropTableTask;
pub use drop_view::DropViewTask;
pub use grant::GrantTask;
pub use rename_column::RenameColumnTask;
pub use rename_schema::RenameSchemaTask;
pub use rename_table::RenameTableTask;
pub use revoke::RevokeTask;
pub use task_registry::DataDefinitionTaskRegistry;
