use std::str::FromStr;

use async_trait::async_trait;
use mcb_domain::entities::{ColumnReference, DerivationType};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::ColumnReferenceRepository;
use mcb_domain::value_objects::IndexRunId;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

use crate::db::entities::column_reference::{self, ActiveModel, Entity};
use crate::db::repos::common::map_db_err;

pub struct SeaOrmColumnReferenceRepository {
    db: DatabaseConnection,
}

impl SeaOrmColumnReferenceRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(reference: &ColumnReference) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        project_id: Set(reference.project_id.to_string()),
        index_run_id: Set(reference.index_run_id.to_string()),
        source_column_fqn: Set(reference.source_column_fqn.clone()),
        target_column_fqn: Set(reference.target_column_fqn.clone()),
        derivation_type: Set(reference.derivation_type.to_string()),
        expression: Set(reference.expression.clone()),
        line: Set(reference.line as i32),
    }
}

fn from_model(model: column_reference::Model) -> Result<ColumnReference> {
    Ok(ColumnReference {
        project_id: crate::db::repos::common::parse_id("column_reference.project_id", &model.project_id)?,
        index_run_id: crate::db::repos::common::parse_id(
            "column_reference.index_run_id",
            &model.index_run_id,
        )?,
        source_column_fqn: model.source_column_fqn,
        target_column_fqn: model.target_column_fqn,
        derivation_type: DerivationType::from_str(&model.derivation_type).map_err(|_| {
            Error::storage_permanent(format!("unknown derivation_type {}", model.derivation_type))
        })?,
        expression: model.expression,
        line: model.line as u32,
    })
}

#[async_trait]
impl ColumnReferenceRepository for SeaOrmColumnReferenceRepository {
    async fn insert_batch(&self, references: &[ColumnReference]) -> Result<()> {
        if references.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await.map_err(map_db_err("begin column reference batch"))?;
        for reference in references {
            Entity::insert(to_active(reference))
                .exec(&txn)
                .await
                .map_err(map_db_err("insert column reference"))?;
        }
        txn.commit().await.map_err(map_db_err("commit column reference batch"))?;
        Ok(())
    }

    async fn list_for_run(&self, index_run_id: IndexRunId) -> Result<Vec<ColumnReference>> {
        let models = Entity::find()
            .filter(column_reference::Column::IndexRunId.eq(index_run_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list column references for run"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn delete_for_run(&self, index_run_id: IndexRunId) -> Result<()> {
        Entity::delete_many()
            .filter(column_reference::Column::IndexRunId.eq(index_run_id.to_string()))
            .exec(&self.db)
            .await
            .map_err(map_db_err("delete column references for run"))?;
        Ok(())
    }
}
