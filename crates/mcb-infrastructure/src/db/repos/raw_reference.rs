use std::str::FromStr;

use async_trait::async_trait;
use mcb_domain::entities::EdgeType;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::RawReferenceRecord;
use mcb_domain::ports::RawReferenceRepository;
use mcb_domain::value_objects::{Confidence, ProjectId, RawReferenceId};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};

use crate::db::entities::raw_reference::{self, ActiveModel, Entity};
use crate::db::repos::common::{map_db_err, parse_id};

pub struct SeaOrmRawReferenceRepository {
    db: DatabaseConnection,
}

impl SeaOrmRawReferenceRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(record: &RawReferenceRecord) -> ActiveModel {
    ActiveModel {
        id: Set(record.id.to_string()),
        project_id: Set(record.project_id.to_string()),
        file_id: Set(record.file_id.to_string()),
        language: Set(record.language.tag().to_owned()),
        from_symbol: Set(record.from_symbol.map(|id| id.to_string())),
        to_name: Set(record.to_name.clone()),
        to_qualified: Set(record.to_qualified.clone()),
        reference_type: Set(record.reference_type.to_string()),
        confidence: Set(record.confidence.value()),
        context: Set(Some(record.context.to_string())),
    }
}

fn from_model(model: raw_reference::Model) -> Result<RawReferenceRecord> {
    Ok(RawReferenceRecord {
        id: parse_id("raw_reference", &model.id)?,
        project_id: parse_id("raw_reference.project_id", &model.project_id)?,
        file_id: parse_id("raw_reference.file_id", &model.file_id)?,
        language: mcb_domain::value_objects::Language::from_tag(&model.language)
            .ok_or_else(|| Error::storage_permanent(format!("unknown language {}", model.language)))?,
        from_symbol: model
            .from_symbol
            .map(|raw| parse_id("raw_reference.from_symbol", &raw))
            .transpose()?,
        to_name: model.to_name,
        to_qualified: model.to_qualified,
        reference_type: EdgeType::from_str(&model.reference_type).map_err(|_| {
            Error::storage_permanent(format!("unknown reference_type {}", model.reference_type))
        })?,
        confidence: Confidence::new(model.confidence)
            .map_err(|e| Error::storage_permanent(format!("stored confidence invalid: {e}")))?,
        context: model
            .context
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| Error::storage_permanent(format!("malformed reference context: {e}")))?
            .unwrap_or(serde_json::Value::Null),
    })
}

#[async_trait]
impl RawReferenceRepository for SeaOrmRawReferenceRepository {
    async fn insert_batch(&self, references: &[RawReferenceRecord]) -> Result<()> {
        if references.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await.map_err(map_db_err("begin raw reference batch"))?;
        for reference in references {
            Entity::insert(to_active(reference))
                .exec(&txn)
                .await
                .map_err(map_db_err("insert raw reference"))?;
        }
        txn.commit().await.map_err(map_db_err("commit raw reference batch"))?;
        Ok(())
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<RawReferenceRecord>> {
        let models = Entity::find()
            .filter(raw_reference::Column::ProjectId.eq(project_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list raw references for project"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn delete_batch(&self, ids: &[RawReferenceId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        Entity::delete_many()
            .filter(raw_reference::Column::Id.is_in(ids))
            .exec(&self.db)
            .await
            .map_err(map_db_err("delete raw reference batch"))?;
        Ok(())
    }
}
