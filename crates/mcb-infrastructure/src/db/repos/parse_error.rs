use async_trait::async_trait;
use mcb_domain::entities::ParseErrorRecord;
use mcb_domain::error::Result;
use mcb_domain::ports::ParseErrorRepository;
use mcb_domain::value_objects::ProjectId;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::entities::parse_error::{self, ActiveModel, Entity};
use crate::db::repos::common::{map_db_err, parse_id};

pub struct SeaOrmParseErrorRepository {
    db: DatabaseConnection,
}

impl SeaOrmParseErrorRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(record: &ParseErrorRecord) -> ActiveModel {
    ActiveModel {
        id: Set(record.id.to_string()),
        project_id: Set(record.project_id.to_string()),
        file_id: Set(record.file_id.to_string()),
        line: Set(record.line as i32),
        column: Set(record.column.map(|c| c as i32)),
        message: Set(record.message.clone()),
        created_at: Set(record.created_at),
    }
}

fn from_model(model: parse_error::Model) -> Result<ParseErrorRecord> {
    Ok(ParseErrorRecord {
        id: parse_id("parse_error", &model.id)?,
        project_id: parse_id("parse_error.project_id", &model.project_id)?,
        file_id: parse_id("parse_error.file_id", &model.file_id)?,
        line: model.line as u32,
        column: model.column.map(|c| c as u32),
        message: model.message,
        created_at: model.created_at,
    })
}

#[async_trait]
impl ParseErrorRepository for SeaOrmParseErrorRepository {
    async fn insert(&self, record: &ParseErrorRecord) -> Result<()> {
        Entity::insert(to_active(record))
            .exec(&self.db)
            .await
            .map_err(map_db_err("insert parse error"))?;
        Ok(())
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ParseErrorRecord>> {
        let models = Entity::find()
            .filter(parse_error::Column::ProjectId.eq(project_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list parse errors for project"))?;
        models.into_iter().map(from_model).collect()
    }
}
