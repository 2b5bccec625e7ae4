use std::str::FromStr;

use async_trait::async_trait;
use mcb_domain::entities::{DerivationType, EdgeType, SymbolEdge, SymbolEdgeMetadata};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::SymbolEdgeRepository;
use mcb_domain::value_objects::{Confidence, ProjectId, SymbolEdgeId};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use crate::db::entities::symbol_edge::{self, ActiveModel, Entity};
use crate::db::repos::common::{map_db_err, parse_id, require_found};

pub struct SeaOrmSymbolEdgeRepository {
    db: DatabaseConnection,
}

impl SeaOrmSymbolEdgeRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(edge: &SymbolEdge) -> ActiveModel {
    ActiveModel {
        id: Set(edge.id.to_string()),
        project_id: Set(edge.project_id.to_string()),
        source_symbol_id: Set(edge.source_symbol_id.to_string()),
        target_symbol_id: Set(edge.target_symbol_id.to_string()),
        edge_type: Set(edge.edge_type.to_string()),
        confidence: Set(edge.metadata.confidence.value()),
        match_strategy: Set(edge.metadata.match_strategy.clone()),
        bridge: Set(edge.metadata.bridge.clone()),
        derivation_type: Set(edge.metadata.derivation_type.map(|d| d.to_string())),
        expression: Set(edge.metadata.expression.clone()),
    }
}

fn from_model(model: symbol_edge::Model) -> Result<SymbolEdge> {
    let derivation_type = model
        .derivation_type
        .as_deref()
        .map(DerivationType::from_str)
        .transpose()
        .map_err(|_| Error::storage_permanent("stored derivation_type invalid"))?;
    Ok(SymbolEdge {
        id: parse_id("symbol_edge", &model.id)?,
        project_id: parse_id("symbol_edge.project_id", &model.project_id)?,
        source_symbol_id: parse_id("symbol_edge.source_symbol_id", &model.source_symbol_id)?,
        target_symbol_id: parse_id("symbol_edge.target_symbol_id", &model.target_symbol_id)?,
        edge_type: EdgeType::from_str(&model.edge_type)
            .map_err(|_| Error::storage_permanent(format!("unknown edge_type {}", model.edge_type)))?,
        metadata: SymbolEdgeMetadata {
            confidence: Confidence::new(model.confidence)
                .map_err(|e| Error::storage_permanent(format!("stored confidence invalid: {e}")))?,
            match_strategy: model.match_strategy,
            bridge: model.bridge,
            derivation_type,
            expression: model.expression,
        },
    })
}

fn upsert_on_conflict() -> sea_orm::sea_query::OnConflict {
    sea_orm::sea_query::OnConflict::column(symbol_edge::Column::Id)
        .update_columns([
            symbol_edge::Column::Confidence,
            symbol_edge::Column::MatchStrategy,
            symbol_edge::Column::Bridge,
            symbol_edge::Column::DerivationType,
            symbol_edge::Column::Expression,
        ])
        .to_owned()
}

#[async_trait]
impl SymbolEdgeRepository for SeaOrmSymbolEdgeRepository {
    async fn upsert(&self, edge: &SymbolEdge) -> Result<()> {
        Entity::insert(to_active(edge))
            .on_conflict(upsert_on_conflict())
            .exec(&self.db)
            .await
            .map_err(map_db_err("upsert symbol edge"))?;
        Ok(())
    }

    async fn upsert_batch(&self, edges: &[SymbolEdge]) -> Result<()> {
        if edges.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await.map_err(map_db_err("begin edge batch"))?;
        for edge in edges {
            Entity::insert(to_active(edge))
                .on_conflict(upsert_on_conflict())
                .exec(&txn)
                .await
                .map_err(map_db_err("upsert symbol edge batch"))?;
        }
        txn.commit().await.map_err(map_db_err("commit edge batch"))?;
        Ok(())
    }

    async fn get(&self, id: SymbolEdgeId) -> Result<SymbolEdge> {
        let model = Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err("get symbol edge"))?;
        from_model(require_found(model, &format!("symbol edge {id}"))?)
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<SymbolEdge>> {
        let models = Entity::find()
            .filter(symbol_edge::Column::ProjectId.eq(project_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list symbol edges for project"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn list_for_project_batched(
        &self,
        project_id: ProjectId,
        batch_size: usize,
        offset: usize,
    ) -> Result<Vec<SymbolEdge>> {
        let models = Entity::find()
            .filter(symbol_edge::Column::ProjectId.eq(project_id.to_string()))
            .offset(offset as u64)
            .limit(batch_size as u64)
            .all(&self.db)
            .await
            .map_err(map_db_err("list symbol edges batched"))?;
        models.into_iter().map(from_model).collect()
    }
}
