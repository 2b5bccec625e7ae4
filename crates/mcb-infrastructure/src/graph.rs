//! Graph Store (GS, §2, §4.7): a denormalized adjacency mirror of the
//! Relational Store, sharing its `sea-orm` connection pool but queried
//! with raw SQL rather than entity CRUD — traversal here is plain
//! upserts into two tables, not repository-shaped access.

use async_trait::async_trait;
use mcb_domain::error::Result;
use mcb_domain::ports::{GraphStore, GraphSyncBatch};
use mcb_domain::value_objects::ProjectId;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, TransactionTrait, Value};

use crate::error::graph_err;

/// Graph relationship kind (§6 "Graph store schema"): every `SymbolEdge`
/// mirrors to one of the two, distinguished by `edge_type.is_column_lineage()`.
const RELATIONSHIP_DEPENDS_ON: &str = "DEPENDS_ON";
const RELATIONSHIP_COLUMN_FLOW: &str = "COLUMN_FLOW";

/// `sea-orm`-backed Graph Store, mirroring `symbols`/`files` as
/// `graph_nodes` and `symbol_edges` as `graph_edges` in the same
/// database the Relational Store uses.
pub struct SeaOrmGraphStore {
    db: DatabaseConnection,
}

impl SeaOrmGraphStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn raw(&self, sql: &str, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(self.db.get_database_backend(), sql, values)
    }
}

#[async_trait]
impl GraphStore for SeaOrmGraphStore {
    async fn ensure_constraints(&self) -> Result<()> {
        self.db
            .execute_unprepared(
                "CREATE TABLE IF NOT EXISTS graph_nodes (
                    project_id TEXT NOT NULL,
                    id TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    label TEXT NOT NULL,
                    PRIMARY KEY (project_id, id)
                )",
            )
            .await
            .map_err(|e| graph_err("ensure graph_nodes table", e))?;

        self.db
            .execute_unprepared(
                "CREATE TABLE IF NOT EXISTS graph_edges (
                    project_id TEXT NOT NULL,
                    id TEXT NOT NULL,
                    source_id TEXT NOT NULL,
                    target_id TEXT NOT NULL,
                    edge_type TEXT NOT NULL,
                    relationship TEXT NOT NULL,
                    confidence DOUBLE PRECISION NOT NULL,
                    derivation_type TEXT,
                    expression TEXT,
                    PRIMARY KEY (project_id, id)
                )",
            )
            .await
            .map_err(|e| graph_err("ensure graph_edges table", e))?;

        Ok(())
    }

    async fn sync_batch(&self, project_id: ProjectId, batch: &GraphSyncBatch) -> Result<()> {
        let txn = self.db.begin().await.map_err(|e| graph_err("begin graph sync batch", e))?;

        for symbol in &batch.symbol_nodes {
            txn.execute(self.raw(
                "INSERT INTO graph_nodes (project_id, id, kind, label) VALUES (?, ?, ?, ?)
                 ON CONFLICT (project_id, id) DO UPDATE SET kind = excluded.kind, label = excluded.label",
                vec![
                    project_id.to_string().into(),
                    symbol.id.to_string().into(),
                    symbol.kind.to_string().into(),
                    symbol.qualified_name.clone().into(),
                ],
            ))
            .await
            .map_err(|e| graph_err("upsert graph symbol node", e))?;
        }

        for file in &batch.file_nodes {
            txn.execute(self.raw(
                "INSERT INTO graph_nodes (project_id, id, kind, label) VALUES (?, ?, 'file', ?)
                 ON CONFLICT (project_id, id) DO UPDATE SET label = excluded.label",
                vec![
                    project_id.to_string().into(),
                    file.id.to_string().into(),
                    file.path.clone().into(),
                ],
            ))
            .await
            .map_err(|e| graph_err("upsert graph file node", e))?;
        }

        for edge in &batch.edges {
            let relationship = if edge.edge_type.is_column_lineage() {
                RELATIONSHIP_COLUMN_FLOW
            } else {
                RELATIONSHIP_DEPENDS_ON
            };
            txn.execute(self.raw(
                "INSERT INTO graph_edges
                    (project_id, id, source_id, target_id, edge_type, relationship, confidence, derivation_type, expression)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT (project_id, id) DO UPDATE SET
                    confidence = excluded.confidence,
                    derivation_type = excluded.derivation_type,
                    expression = excluded.expression",
                vec![
                    project_id.to_string().into(),
                    edge.id.to_string().into(),
                    edge.source_symbol_id.to_string().into(),
                    edge.target_symbol_id.to_string().into(),
                    edge.edge_type.to_string().into(),
                    relationship.into(),
                    edge.metadata.confidence.value().into(),
                    edge.metadata.derivation_type.map(|d| d.to_string()).into(),
                    edge.metadata.expression.clone().into(),
                ],
            ))
            .await
            .map_err(|e| graph_err("upsert graph edge", e))?;
        }

        txn.commit().await.map_err(|e| graph_err("commit graph sync batch", e))?;
        Ok(())
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| graph_err("begin graph project delete", e))?;

        txn.execute(self.raw(
            "DELETE FROM graph_edges WHERE project_id = ?",
            vec![project_id.to_string().into()],
        ))
        .await
        .map_err(|e| graph_err("delete graph edges for project", e))?;

        txn.execute(self.raw(
            "DELETE FROM graph_nodes WHERE project_id = ?",
            vec![project_id.to_string().into()],
        ))
        .await
        .map_err(|e| graph_err("delete graph nodes for project", e))?;

        txn.commit().await.map_err(|e| graph_err("commit graph project delete", e))?;
        Ok(())
    }
}
