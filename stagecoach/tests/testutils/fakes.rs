//! Fake collaborators recording every call they receive

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use stagecoach::ast::{Expression, Privilege, Statement};
use stagecoach::catalog::{
    CatalogSchemaName, ColumnMetadata, InMemoryMetadata, Metadata, MetadataResult,
    QualifiedObjectName, TableMetadata,
};
use stagecoach::memory::{MemoryError, MemoryInfo, NodeMemoryClient, WorkerNode};
use stagecoach::scheduler::{StageDescriptor, StageGraph, StageId};
use stagecoach::{ExecutionError, QueryId, QueryPlanner, Session, StageLauncher};

/// Metadata delegating to [`InMemoryMetadata`] and logging each mutation
#[derive(Default)]
pub struct RecordingMetadata {
    inner: InMemoryMetadata,
    calls: Mutex<Vec<String>>,
}

impl RecordingMetadata {
    pub fn with_catalogs(catalogs: &[&str]) -> Self {
        Self {
            inner: InMemoryMetadata::with_catalogs(catalogs.iter().copied()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Catalog state behind the recorder
    pub fn inner(&self) -> &InMemoryMetadata {
        &self.inner
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl Metadata for RecordingMetadata {
    fn catalog_exists(&self, session: &Session, catalog: &str) -> bool {
        self.inner.catalog_exists(session, catalog)
    }

    fn schema_exists(&self, session: &Session, schema: &CatalogSchemaName) -> bool {
        self.inner.schema_exists(session, schema)
    }

    fn create_schema(&self, session: &Session, schema: &CatalogSchemaName) -> MetadataResult<()> {
        self.record(format!("create_schema({})", schema));
        self.inner.create_schema(session, schema)
    }

    fn drop_schema(
        &self,
        session: &Session,
        schema: &CatalogSchemaName,
        cascade: bool,
    ) -> MetadataResult<()> {
        self.record(format!("drop_schema({}, {})", schema, cascade));
        self.inner.drop_schema(session, schema, cascade)
    }

    fn rename_schema(
        &self,
        session: &Session,
        source: &CatalogSchemaName,
        target: &str,
    ) -> MetadataResult<()> {
        self.record(format!("rename_schema({}, {})", source, target));
        self.inner.rename_schema(session, source, target)
    }

    fn table_exists(&self, session: &Session, table: &QualifiedObjectName) -> bool {
        self.inner.table_exists(session, table)
    }

    fn create_table(
        &self,
        session: &Session,
        table: &TableMetadata,
        ignore_existing: bool,
    ) -> MetadataResult<()> {
        self.record(format!("create_table({})", table.name));
        self.inner.create_table(session, table, ignore_existing)
    }

    fn drop_table(&self, session: &Session, table: &QualifiedObjectName) -> MetadataResult<()> {
        self.record(format!("drop_table({})", table));
        self.inner.drop_table(session, table)
    }

    fn get_table(&self, session: &Session, table: &QualifiedObjectName) -> Option<TableMetadata> {
        self.inner.get_table(session, table)
    }

    fn rename_table(
        &self,
        session: &Session,
        source: &QualifiedObjectName,
        target: &QualifiedObjectName,
    ) -> MetadataResult<()> {
        self.record(format!("rename_table({}, {})", source, target));
        self.inner.rename_table(session, source, target)
    }

    fn add_column(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        column: &ColumnMetadata,
    ) -> MetadataResult<()> {
        self.record(format!("add_column({}, {})", table, column.name));
        self.inner.add_column(session, table, column)
    }

    fn rename_column(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        source: &str,
        target: &str,
    ) -> MetadataResult<()> {
        self.record(format!("rename_column({}, {}, {})", table, source, target));
        self.inner.rename_column(session, table, source, target)
    }

    fn drop_column(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        column: &str,
    ) -> MetadataResult<()> {
        self.record(format!("drop_column({}, {})", table, column));
        self.inner.drop_column(session, table, column)
    }

    fn view_exists(&self, session: &Session, view: &QualifiedObjectName) -> bool {
        self.inner.view_exists(session, view)
    }

    fn create_view(
        &self,
        session: &Session,
        view: &QualifiedObjectName,
        view_sql: &str,
        replace: bool,
    ) -> MetadataResult<()> {
        self.record(format!("create_view({})", view));
        self.inner.create_view(session, view, view_sql, replace)
    }

    fn drop_view(&self, session: &Session, view: &QualifiedObjectName) -> MetadataResult<()> {
        self.record(format!("drop_view({})", view));
        self.inner.drop_view(session, view)
    }

    fn create_model(&self, session: &Session, catalog: &str, model: &str) -> MetadataResult<()> {
        self.record(format!("create_model({}, {})", catalog, model));
        self.inner.create_model(session, catalog, model)
    }

    fn drop_model(&self, session: &Session, catalog: &str, model: &str) -> MetadataResult<()> {
        self.record(format!("drop_model({}, {})", catalog, model));
        self.inner.drop_model(session, catalog, model)
    }

    fn list_models(&self, session: &Session, catalog: Option<&str>) -> Vec<(String, String)> {
        self.inner.list_models(session, catalog)
    }

    fn grant_table_privileges(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        privileges: &BTreeSet<Privilege>,
        grantee: &str,
        grant_option: bool,
    ) -> MetadataResult<()> {
        self.record(format!("grant({}, {})", table, grantee));
        self.inner
            .grant_table_privileges(session, table, privileges, grantee, grant_option)
    }

    fn revoke_table_privileges(
        &self,
        session: &Session,
        table: &QualifiedObjectName,
        privileges: &BTreeSet<Privilege>,
        grantee: &str,
        grant_option: bool,
    ) -> MetadataResult<()> {
        self.record(format!("revoke({}, {})", table, grantee));
        self.inner
            .revoke_table_privileges(session, table, privileges, grantee, grant_option)
    }

    fn call_procedure(
        &self,
        session: &Session,
        procedure: &QualifiedObjectName,
        arguments: &[Expression],
    ) -> MetadataResult<()> {
        self.record(format!("call({})", procedure));
        self.inner.call_procedure(session, procedure, arguments)
    }
}

/// Planner returning the same stage graph for every statement
pub struct FixedPlanner {
    graph: Mutex<StageGraph>,
}

impl FixedPlanner {
    pub fn new(graph: StageGraph) -> Self {
        Self {
            graph: Mutex::new(graph),
        }
    }

    pub fn set_graph(&self, graph: StageGraph) {
        *self.graph.lock() = graph;
    }
}

impl Default for FixedPlanner {
    fn default() -> Self {
        Self::new(three_level_graph())
    }
}

#[async_trait]
impl QueryPlanner for FixedPlanner {
    async fn plan(
        &self,
        _session: &Session,
        _statement: &Statement,
        _parameters: &[Expression],
    ) -> Result<StageGraph, ExecutionError> {
        Ok(self.graph.lock().clone())
    }
}

/// output(0) <- join(1) <- scan orders(2), scan customers(3)
pub fn three_level_graph() -> StageGraph {
    StageGraph::new(
        StageId(0),
        vec![
            StageDescriptor::new(0, "output"),
            StageDescriptor::new(1, "join"),
            StageDescriptor::new(2, "scan orders"),
            StageDescriptor::new(3, "scan customers"),
        ],
        &[
            (StageId(0), StageId(1)),
            (StageId(1), StageId(2)),
            (StageId(1), StageId(3)),
        ],
    )
    .expect("valid stage graph")
}

/// Launcher recording the order in which stages start
#[derive(Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<(QueryId, StageId)>>,
    aborted: Mutex<Vec<QueryId>>,
    failing_stages: Mutex<BTreeSet<StageId>>,
}

impl RecordingLauncher {
    pub fn fail_stage(&self, stage: StageId) {
        self.failing_stages.lock().insert(stage);
    }

    pub fn launched(&self, query_id: &QueryId) -> Vec<StageId> {
        self.launched
            .lock()
            .iter()
            .filter(|(id, _)| id == query_id)
            .map(|(_, stage)| *stage)
            .collect()
    }

    pub fn aborted(&self) -> Vec<QueryId> {
        self.aborted.lock().clone()
    }
}

#[async_trait]
impl StageLauncher for RecordingLauncher {
    async fn launch_stage(
        &self,
        query_id: &QueryId,
        stage: &StageDescriptor,
    ) -> Result<(), ExecutionError> {
        if self.failing_stages.lock().contains(&stage.id) {
            return Err(ExecutionError::Scheduling(format!(
                "No worker available for stage {}",
                stage.id
            )));
        }
        self.launched.lock().push((query_id.clone(), stage.id));
        Ok(())
    }

    async fn abort_query(&self, query_id: &QueryId) {
        self.aborted.lock().push(query_id.clone());
    }
}

#[derive(Clone)]
enum NodeBehavior {
    Respond(MemoryInfo),
    Fail(String),
    Hang,
}

/// Node client answering from a table set by the test
#[derive(Default)]
pub struct FakeNodeClient {
    nodes: Mutex<HashMap<String, NodeBehavior>>,
    requests: Mutex<Vec<String>>,
}

impl FakeNodeClient {
    pub fn respond(&self, node_id: &str, info: MemoryInfo) {
        self.nodes
            .lock()
            .insert(node_id.to_string(), NodeBehavior::Respond(info));
    }

    pub fn fail(&self, node_id: &str, message: &str) {
        self.nodes
            .lock()
            .insert(node_id.to_string(), NodeBehavior::Fail(message.to_string()));
    }

    /// Never answer; the poll runs into its timeout
    pub fn hang(&self, node_id: &str) {
        self.nodes.lock().insert(node_id.to_string(), NodeBehavior::Hang);
    }

    pub fn request_count(&self, node_id: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|id| id.as_str() == node_id)
            .count()
    }
}

#[async_trait]
impl NodeMemoryClient for FakeNodeClient {
    async fn get_memory_info(&self, node: &WorkerNode) -> Result<MemoryInfo, MemoryError> {
        self.requests.lock().push(node.node_id.clone());
        let behavior = self.nodes.lock().get(&node.node_id).cloned();
        match behavior {
            Some(NodeBehavior::Respond(info)) => Ok(info),
            Some(NodeBehavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(MemoryError::Transport {
                    node: node.node_id.clone(),
                    message: "hung".to_string(),
                })
            }
            Some(NodeBehavior::Fail(message)) => Err(MemoryError::Transport {
                node: node.node_id.clone(),
                message,
            }),
            None => Err(MemoryError::Transport {
                node: node.node_id.clone(),
                message: "unknown node".to_string(),
            }),
        }
    }
}
