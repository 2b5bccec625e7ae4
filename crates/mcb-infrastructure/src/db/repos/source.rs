use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use mcb_domain::entities::{Source, SourceType};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::SourceRepository;
use mcb_domain::value_objects::{ProjectId, SourceId};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::entities::source::{self, ActiveModel, Entity};
use crate::db::repos::common::{from_json, map_db_err, parse_id, require_found, to_json};

pub struct SeaOrmSourceRepository {
    db: DatabaseConnection,
}

impl SeaOrmSourceRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(source: &Source) -> Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(source.id.to_string()),
        project_id: Set(source.project_id.to_string()),
        source_type: Set(source.source_type.to_string()),
        connection_uri: Set(source.connection_uri.clone()),
        config: Set(to_json("source config", &source.config)?),
        last_synced_at: Set(source.last_synced_at),
        last_commit_sha: Set(source.last_commit_sha.clone()),
        created_at: Set(source.created_at),
    })
}

fn from_model(model: source::Model) -> Result<Source> {
    Ok(Source {
        id: parse_id("source", &model.id)?,
        project_id: parse_id("source.project_id", &model.project_id)?,
        source_type: SourceType::from_str(&model.source_type)
            .map_err(|_| Error::storage_permanent(format!("unknown source_type {}", model.source_type)))?,
        connection_uri: model.connection_uri,
        config: from_json::<BTreeMap<String, serde_json::Value>>("source config", model.config)?,
        last_synced_at: model.last_synced_at,
        last_commit_sha: model.last_commit_sha,
        created_at: model.created_at,
    })
}

#[async_trait]
impl SourceRepository for SeaOrmSourceRepository {
    async fn upsert(&self, source: &Source) -> Result<()> {
        let active = to_active(source)?;
        Entity::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(source::Column::Id)
                    .update_columns([
                        source::Column::ConnectionUri,
                        source::Column::Config,
                        source::Column::LastSyncedAt,
                        source::Column::LastCommitSha,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(map_db_err("upsert source"))?;
        Ok(())
    }

    async fn get(&self, id: SourceId) -> Result<Source> {
        let model = Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err("get source"))?;
        from_model(require_found(model, &format!("source {id}"))?)
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<Source>> {
        let models = Entity::find()
            .filter(source::Column::ProjectId.eq(project_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list sources for project"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn delete(&self, id: SourceId) -> Result<()> {
        Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(map_db_err("delete source"))?;
        Ok(())
    }
}
