//! Data definition statements through the coordinator
//!
//! Each statement runs as a regular query: it is listed, has a terminal
//! state and reports session updates to the client.

#[path = "testutils/mod.rs"]
mod testutils;

use stagecoach::ast::{Expression, StatementKind};
use stagecoach::catalog::MetadataError;
use stagecoach::coordinator::{data_definition_kinds, QueryType};
use stagecoach::exec::SemanticErrorCode;
use stagecoach::txn::TransactionManager;
use stagecoach::{ExecutionError, QueryState};
use testutils::statements::*;
use testutils::test_fixture::TestFixture;

#[tokio::test]
async fn test_data_definition_kinds_match_task_registry() {
    let fixture = TestFixture::new();
    assert_eq!(fixture.coordinator.tasks().kinds(), data_definition_kinds());
}

#[tokio::test]
async fn test_create_model_requires_catalog_and_model() {
    let fixture = TestFixture::new();

    let error = fixture
        .assert_fails(create_model("model1"), "Too few parts in model name: model1")
        .await;
    assert_eq!(
        error.semantic_code(),
        Some(SemanticErrorCode::InvalidModelName)
    );
    assert!(fixture.metadata.calls().is_empty());

    let info = fixture.assert_succeeds(create_model("catalog1.model1")).await;
    assert_eq!(info.query_type, QueryType::DataDefinition);
    assert_eq!(info.statement_kind, StatementKind::CreateModel);
    assert_eq!(fixture.metadata.calls(), vec!["create_model(catalog1, model1)"]);
}

#[tokio::test]
async fn test_create_model_conflict_is_propagated() {
    let fixture = TestFixture::new();
    fixture.assert_succeeds(create_model("catalog1.model1")).await;

    let error = fixture
        .assert_fails(create_model("catalog1.model1"), "already exists")
        .await;
    assert!(matches!(
        error,
        ExecutionError::Metadata(MetadataError::ModelAlreadyExists(_))
    ));
    assert_eq!(fixture.metadata.calls().len(), 2);
}

#[tokio::test]
async fn test_delete_model() {
    let fixture = TestFixture::new();
    let error = fixture
        .assert_fails(delete_model("a.b.c"), "Too many parts in model name: a.b.c")
        .await;
    assert_eq!(
        error.semantic_code(),
        Some(SemanticErrorCode::InvalidModelName)
    );
    assert!(fixture.metadata.calls().is_empty());

    fixture.assert_succeeds(create_model("catalog1.model1")).await;
    fixture.assert_succeeds(delete_model("catalog1.model1")).await;
    fixture.assert_fails(delete_model("catalog1.model1"), "Model not found").await;
    assert_eq!(
        fixture.metadata.calls(),
        vec![
            "create_model(catalog1, model1)",
            "drop_model(catalog1, model1)",
            "drop_model(catalog1, model1)",
        ]
    );
}

#[tokio::test]
async fn test_explain_create_model_does_not_touch_metadata() {
    let fixture = TestFixture::new();
    let text = fixture
        .coordinator
        .explain(&fixture.session(), &create_model("catalog1.model1"), &[])
        .await
        .unwrap();
    assert_eq!(text, "CREATE MODEL catalog1.model1");
    assert!(fixture.metadata.calls().is_empty());
}

#[tokio::test]
async fn test_use_updates_client_session() {
    let fixture = TestFixture::new();
    fixture
        .assert_fails(use_schema(None, "web"), "Catalog must be specified")
        .await;
    fixture
        .assert_fails(use_schema(Some("missing"), "web"), "Catalog missing does not exist")
        .await;

    fixture.assert_succeeds(use_schema(Some("hive"), "web")).await;
    let session = fixture.session();
    assert_eq!(session.catalog.as_deref(), Some("hive"));
    assert_eq!(session.schema.as_deref(), Some("web"));

    // Partially qualified names now resolve against the session
    fixture.assert_succeeds(create_schema("sales")).await;
    assert_eq!(fixture.metadata.calls(), vec!["create_schema(hive.sales)"]);
}

#[tokio::test]
async fn test_set_session_validates_and_resolves_parameters() {
    let fixture = TestFixture::new();
    fixture
        .assert_fails(
            set_session("no_such_property", Expression::BooleanLiteral(true)),
            "does not exist",
        )
        .await;

    let info = fixture
        .execute_with(
            set_session("query_max_memory", Expression::Parameter(0)),
            vec![Expression::StringLiteral("2GB".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(info.state, QueryState::Finished);
    assert_eq!(
        fixture.session().system_property("query_max_memory"),
        Some("2GB")
    );
}

#[tokio::test]
async fn test_auto_commit_transaction_per_statement() {
    let fixture = TestFixture::new();
    fixture.assert_succeeds(create_model("catalog1.model1")).await;
    fixture.assert_fails(create_model("catalog1.model1"), "already exists").await;

    let finished = fixture.transactions.finished_transactions();
    assert_eq!(finished.len(), 2);
    assert!(finished.iter().all(|txn| txn.auto_commit));
    assert!(fixture.transactions.active_transactions().is_empty());
}

#[tokio::test]
async fn test_explicit_transaction_lifecycle() {
    let fixture = TestFixture::new();
    fixture
        .assert_fails(commit(), "No transaction in progress")
        .await;

    fixture.assert_succeeds(start_transaction(false)).await;
    let transaction_id = fixture.session().transaction_id.expect("transaction started");
    fixture
        .assert_fails(start_transaction(false), "Nested transactions not supported")
        .await;

    fixture.assert_succeeds(create_model("catalog1.model1")).await;
    assert!(fixture
        .transactions
        .transaction_info(transaction_id)
        .unwrap()
        .is_active());

    fixture.assert_succeeds(commit()).await;
    assert!(fixture.session().transaction_id.is_none());
    assert!(fixture.transactions.active_transactions().is_empty());
}

#[tokio::test]
async fn test_read_only_transaction_rejects_writes() {
    let fixture = TestFixture::new();
    fixture.assert_succeeds(start_transaction(true)).await;
    fixture
        .assert_fails(create_model("catalog1.model1"), "read only")
        .await;
    assert!(fixture.metadata.calls().is_empty());

    // Session statements do not write metadata
    fixture.assert_succeeds(use_schema(Some("hive"), "web")).await;
    fixture.assert_succeeds(rollback()).await;
    assert!(fixture.session().transaction_id.is_none());
}

#[tokio::test]
async fn test_ddl_is_listed_like_any_query() {
    let fixture = TestFixture::new();
    let first = fixture.assert_succeeds(create_model("catalog1.model1")).await;
    let second = fixture.assert_succeeds(create_model("catalog1.model2")).await;

    let listed: Vec<_> = fixture
        .coordinator
        .list_queries()
        .into_iter()
        .map(|info| info.query_id)
        .collect();
    assert_eq!(listed, vec![first.query_id.clone(), second.query_id]);
    assert!(fixture.coordinator.query_info(&first.query_id).unwrap().is_done());
}

#[test]
fn test_submit_outside_runtime_is_rejected() {
    let fixture = TestFixture::new();
    let error = fixture
        .coordinator
        .submit(fixture.session(), create_model("catalog1.model1"), "", vec![])
        .unwrap_err();

    assert!(matches!(error, ExecutionError::Internal(_)), "{:?}", error);
    assert!(fixture.coordinator.list_queries().is_empty());
    assert!(fixture.metadata.calls().is_empty());
}
