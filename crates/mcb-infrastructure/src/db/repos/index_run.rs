use std::str::FromStr;

use async_trait::async_trait;
use mcb_domain::entities::{IndexRun, RunStage, RunStatus};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::IndexRunRepository;
use mcb_domain::value_objects::IndexRunId;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, Statement, Value,
};

use crate::db::entities::index_run::{self, ActiveModel, Entity};
use crate::db::repos::common::{map_db_err, parse_id, require_found};

pub struct SeaOrmIndexRunRepository {
    db: DatabaseConnection,
}

impl SeaOrmIndexRunRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(run: &IndexRun) -> ActiveModel {
    ActiveModel {
        id: Set(run.id.to_string()),
        project_id: Set(run.project_id.to_string()),
        source_id: Set(run.source_id.map(|id| id.to_string())),
        status: Set(run.status.to_string()),
        started_at: Set(run.started_at),
        completed_at: Set(run.completed_at),
        files_processed: Set(run.files_processed as i64),
        symbols_found: Set(run.symbols_found as i64),
        edges_found: Set(run.edges_found as i64),
        error_message: Set(run.error_message.clone()),
        total_chunks: Set(i64::from(run.total_chunks)),
        chunks_remaining: Set(i64::from(run.chunks_remaining)),
        resume_cursor: Set(run.resume_cursor.map(|s| s.to_string())),
    }
}

fn from_model(model: index_run::Model) -> Result<IndexRun> {
    Ok(IndexRun {
        id: parse_id("index_run", &model.id)?,
        project_id: parse_id("index_run.project_id", &model.project_id)?,
        source_id: model
            .source_id
            .map(|raw| parse_id("index_run.source_id", &raw))
            .transpose()?,
        status: RunStatus::from_str(&model.status)
            .map_err(|_| Error::storage_permanent(format!("unknown run status {}", model.status)))?,
        started_at: model.started_at,
        completed_at: model.completed_at,
        files_processed: model.files_processed as u64,
        symbols_found: model.symbols_found as u64,
        edges_found: model.edges_found as u64,
        error_message: model.error_message,
        total_chunks: model.total_chunks as u32,
        chunks_remaining: model.chunks_remaining as u32,
        resume_cursor: model
            .resume_cursor
            .map(|raw| {
                RunStage::from_str(&raw)
                    .map_err(|_| Error::storage_permanent(format!("unknown run stage {raw}")))
            })
            .transpose()?,
    })
}

#[async_trait]
impl IndexRunRepository for SeaOrmIndexRunRepository {
    async fn insert(&self, run: &IndexRun) -> Result<()> {
        Entity::insert(to_active(run))
            .exec(&self.db)
            .await
            .map_err(map_db_err("insert index run"))?;
        Ok(())
    }

    async fn get(&self, id: IndexRunId) -> Result<IndexRun> {
        let model = Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err("get index run"))?;
        from_model(require_found(model, &format!("index run {id}"))?)
    }

    async fn save(&self, run: &IndexRun) -> Result<()> {
        to_active(run)
            .update(&self.db)
            .await
            .map_err(map_db_err("save index run"))?;
        Ok(())
    }

    async fn decrement_chunks_remaining(&self, id: IndexRunId) -> Result<u32> {
        let backend = self.db.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "UPDATE index_runs SET chunks_remaining = chunks_remaining - 1 \
             WHERE id = ? AND chunks_remaining > 0 \
             RETURNING chunks_remaining",
            [Value::from(id.to_string())],
        );

        if let Some(row) = self
            .db
            .query_one(stmt)
            .await
            .map_err(map_db_err("decrement chunks_remaining"))?
        {
            let remaining: i64 = row
                .try_get("", "chunks_remaining")
                .map_err(map_db_err("decode chunks_remaining"))?;
            return Ok(remaining as u32);
        }

        // No row was updated: the run doesn't exist, or its
        // chunks_remaining was already zero.
        let exists = Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err("check index run existence"))?;
        match exists {
            None => Err(Error::not_found(format!("index run {id}"))),
            Some(_) => Err(Error::InvariantViolation {
                message: format!("chunks_remaining underflow on run {id}: already at zero"),
            }),
        }
    }
}
