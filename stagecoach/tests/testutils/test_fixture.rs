//! Test fixture for Stagecoach integration tests
//!
//! Wires a [`QueryCoordinator`] to recording fakes and keeps a client-side
//! session that follows the session updates of finished statements, the
//! way a protocol front end would.

use parking_lot::Mutex;
use std::sync::Arc;

use stagecoach::ast::{Expression, Statement};
use stagecoach::catalog::AllowAllAccessControl;
use stagecoach::memory::{StaticNodeRegistry, WorkerNode};
use stagecoach::txn::InMemoryTransactionManager;
use stagecoach::{
    ConfigError, CoordinatorConfig, CoordinatorServices, ExecutionError, QueryCoordinator, QueryInfo,
    QueryState, Session,
};

use super::fakes::{FakeNodeClient, FixedPlanner, RecordingLauncher, RecordingMetadata};

pub struct TestFixture {
    pub coordinator: QueryCoordinator,
    pub metadata: Arc<RecordingMetadata>,
    pub transactions: Arc<InMemoryTransactionManager>,
    pub planner: Arc<FixedPlanner>,
    pub launcher: Arc<RecordingLauncher>,
    pub nodes: Arc<StaticNodeRegistry>,
    pub memory_client: Arc<FakeNodeClient>,
    session: Mutex<Session>,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        Self::try_with_config(config).expect("Failed to create coordinator")
    }

    pub fn try_with_config(config: CoordinatorConfig) -> Result<Self, ConfigError> {
        let _ = env_logger::builder().is_test(true).try_init();

        let metadata = Arc::new(RecordingMetadata::with_catalogs(&["catalog1", "hive"]));
        let transactions = Arc::new(InMemoryTransactionManager::new());
        let planner = Arc::new(FixedPlanner::default());
        let launcher = Arc::new(RecordingLauncher::default());
        let nodes = Arc::new(StaticNodeRegistry::new(vec![
            WorkerNode::new("worker-1", "http://worker-1:8080"),
            WorkerNode::new("worker-2", "http://worker-2:8080"),
        ]));
        let memory_client = Arc::new(FakeNodeClient::default());

        let services = CoordinatorServices {
            metadata: metadata.clone(),
            access_control: Arc::new(AllowAllAccessControl),
            transaction_manager: transactions.clone(),
            planner: planner.clone(),
            launcher: launcher.clone(),
            node_registry: nodes.clone(),
            memory_client: memory_client.clone(),
        };
        let coordinator = QueryCoordinator::new(config, services)?;

        // Unique user per fixture keeps log output of parallel tests apart
        let user = format!("user_{}", fastrand::u32(..));
        Ok(Self {
            coordinator,
            metadata,
            transactions,
            planner,
            launcher,
            nodes,
            memory_client,
            session: Mutex::new(Session::builder(user).build()),
        })
    }

    pub fn session(&self) -> Session {
        self.session.lock().clone()
    }

    pub fn set_session(&self, session: Session) {
        *self.session.lock() = session;
    }

    /// Submit with the current session and wait for a terminal state.
    /// Session updates of a finished statement are applied.
    pub async fn execute_with(
        &self,
        statement: Statement,
        parameters: Vec<Expression>,
    ) -> Result<QueryInfo, ExecutionError> {
        let query_id =
            self.coordinator
                .submit(self.session(), statement, String::new(), parameters)?;
        let info = self.coordinator.wait_for_completion(&query_id).await?;
        if info.state == QueryState::Finished && !info.session_updates.is_empty() {
            let mut session = self.session.lock();
            *session = session.with_updates(&info.session_updates);
        }
        Ok(info)
    }

    pub async fn execute(&self, statement: Statement) -> Result<QueryInfo, ExecutionError> {
        self.execute_with(statement, Vec::new()).await
    }

    /// Assert that the statement finishes
    pub async fn assert_succeeds(&self, statement: Statement) -> QueryInfo {
        let info = self
            .execute(statement)
            .await
            .unwrap_or_else(|e| panic!("Submission failed: {}", e));
        assert_eq!(
            info.state,
            QueryState::Finished,
            "Query should succeed but failed: {:?}",
            info.error
        );
        info
    }

    /// Assert that the statement fails with a message containing `expected`
    pub async fn assert_fails(&self, statement: Statement, expected: &str) -> ExecutionError {
        let error = match self.execute(statement).await {
            Ok(info) => {
                assert_eq!(info.state, QueryState::Failed, "Query should fail");
                info.error.expect("Failed query carries its error")
            }
            Err(error) => error,
        };
        assert!(
            error.to_string().contains(expected),
            "Error '{}' should contain '{}'",
            error,
            expected
        );
        error
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
