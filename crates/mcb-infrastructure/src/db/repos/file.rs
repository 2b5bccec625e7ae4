use async_trait::async_trait;
use mcb_domain::entities::File;
use mcb_domain::error::Result;
use mcb_domain::ports::FileRepository;
use mcb_domain::value_objects::{FileId, Language, ProjectId, SourceId};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::entities::file::{self, ActiveModel, Entity};
use crate::db::repos::common::{map_db_err, parse_id};

pub struct SeaOrmFileRepository {
    db: DatabaseConnection,
}

impl SeaOrmFileRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(file: &File) -> ActiveModel {
    ActiveModel {
        id: Set(file.id.to_string()),
        project_id: Set(file.project_id.to_string()),
        source_id: Set(file.source_id.to_string()),
        path: Set(file.path.clone()),
        language: Set(file.language.map(|l| l.tag().to_owned())),
        size_bytes: Set(file.size_bytes as i64),
        content_hash: Set(file.content_hash.clone()),
        last_indexed_at: Set(file.last_indexed_at),
        skip_column_lineage: Set(file.skip_column_lineage),
    }
}

fn from_model(model: file::Model) -> Result<File> {
    Ok(File {
        id: parse_id("file", &model.id)?,
        project_id: parse_id("file.project_id", &model.project_id)?,
        source_id: parse_id("file.source_id", &model.source_id)?,
        path: model.path,
        language: model.language.as_deref().and_then(Language::from_tag),
        size_bytes: model.size_bytes as u64,
        content_hash: model.content_hash,
        last_indexed_at: model.last_indexed_at,
        skip_column_lineage: model.skip_column_lineage,
    })
}

#[async_trait]
impl FileRepository for SeaOrmFileRepository {
    async fn upsert(&self, file: &File) -> Result<()> {
        let active = to_active(file);
        Entity::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(file::Column::Id)
                    .update_columns([
                        file::Column::Language,
                        file::Column::SizeBytes,
                        file::Column::ContentHash,
                        file::Column::LastIndexedAt,
                        file::Column::SkipColumnLineage,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(map_db_err("upsert file"))?;
        Ok(())
    }

    async fn get(&self, id: FileId) -> Result<File> {
        let model = Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err("get file"))?;
        from_model(crate::db::repos::common::require_found(
            model,
            &format!("file {id}"),
        )?)
    }

    async fn list_for_source(&self, source_id: SourceId) -> Result<Vec<File>> {
        let models = Entity::find()
            .filter(file::Column::SourceId.eq(source_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list files for source"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<File>> {
        let models = Entity::find()
            .filter(file::Column::ProjectId.eq(project_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list files for project"))?;
        models.into_iter().map(from_model).collect()
    }
}
