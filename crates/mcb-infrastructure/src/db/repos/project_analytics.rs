use std::str::FromStr;

use async_trait::async_trait;
use mcb_domain::entities::{AnalyticsScope, ProjectAnalytics};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::ProjectAnalyticsRepository;
use mcb_domain::value_objects::ProjectId;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};

use crate::db::entities::project_analytics::{self, ActiveModel, Entity};
use crate::db::repos::common::{from_json, map_db_err, parse_id, to_json};

pub struct SeaOrmProjectAnalyticsRepository {
    db: DatabaseConnection,
}

impl SeaOrmProjectAnalyticsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(analytics: &ProjectAnalytics) -> Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(analytics.id.to_string()),
        project_id: Set(analytics.project_id.to_string()),
        scope: Set(analytics.scope.to_string()),
        scope_id: Set(Some(analytics.scope_id.clone())),
        computed_at: Set(analytics.computed_at),
        data: Set(to_json("analytics data", &analytics.data)?),
    })
}

fn from_model(model: project_analytics::Model) -> Result<ProjectAnalytics> {
    Ok(ProjectAnalytics {
        id: parse_id("project_analytics", &model.id)?,
        project_id: parse_id("project_analytics.project_id", &model.project_id)?,
        scope: AnalyticsScope::from_str(&model.scope)
            .map_err(|_| Error::storage_permanent(format!("unknown analytics scope {}", model.scope)))?,
        scope_id: model.scope_id.unwrap_or_default(),
        computed_at: model.computed_at,
        data: from_json("analytics data", model.data)?,
    })
}

fn upsert_on_conflict() -> sea_orm::sea_query::OnConflict {
    sea_orm::sea_query::OnConflict::column(project_analytics::Column::Id)
        .update_columns([project_analytics::Column::ComputedAt, project_analytics::Column::Data])
        .to_owned()
}

#[async_trait]
impl ProjectAnalyticsRepository for SeaOrmProjectAnalyticsRepository {
    async fn upsert(&self, analytics: &ProjectAnalytics) -> Result<()> {
        let active = to_active(analytics)?;
        Entity::insert(active)
            .on_conflict(upsert_on_conflict())
            .exec(&self.db)
            .await
            .map_err(map_db_err("upsert project analytics"))?;
        Ok(())
    }

    async fn upsert_batch(&self, analytics: &[ProjectAnalytics]) -> Result<()> {
        if analytics.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await.map_err(map_db_err("begin analytics batch"))?;
        for entry in analytics {
            let active = to_active(entry)?;
            Entity::insert(active)
                .on_conflict(upsert_on_conflict())
                .exec(&txn)
                .await
                .map_err(map_db_err("upsert project analytics batch"))?;
        }
        txn.commit().await.map_err(map_db_err("commit analytics batch"))?;
        Ok(())
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ProjectAnalytics>> {
        let models = Entity::find()
            .filter(project_analytics::Column::ProjectId.eq(project_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list project analytics"))?;
        models.into_iter().map(from_model).collect()
    }
}
