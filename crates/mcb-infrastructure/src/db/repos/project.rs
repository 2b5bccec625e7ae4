use async_trait::async_trait;
use mcb_domain::entities::{Project, ProjectSettings};
use mcb_domain::error::Result;
use mcb_domain::ports::ProjectRepository;
use mcb_domain::value_objects::ProjectId;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::entities::project::{self, ActiveModel, Entity};
use crate::db::repos::common::{from_json, map_db_err, parse_id, require_found, to_json};

pub struct SeaOrmProjectRepository {
    db: DatabaseConnection,
}

impl SeaOrmProjectRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(project: &Project) -> Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(project.id.to_string()),
        slug: Set(project.slug.clone()),
        display_name: Set(project.display_name.clone()),
        description: Set(project.description.clone()),
        settings: Set(to_json("project settings", &project.settings)?),
        created_at: Set(project.created_at),
        updated_at: Set(project.updated_at),
    })
}

fn from_model(model: project::Model) -> Result<Project> {
    Ok(Project {
        id: parse_id("project", &model.id)?,
        slug: model.slug,
        display_name: model.display_name,
        description: model.description,
        settings: from_json::<ProjectSettings>("project settings", model.settings)?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

#[async_trait]
impl ProjectRepository for SeaOrmProjectRepository {
    async fn upsert(&self, project: &Project) -> Result<()> {
        let active = to_active(project)?;
        Entity::insert(active)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(project::Column::Id)
                    .update_columns([
                        project::Column::Slug,
                        project::Column::DisplayName,
                        project::Column::Description,
                        project::Column::Settings,
                        project::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(map_db_err("upsert project"))?;
        Ok(())
    }

    async fn get(&self, id: ProjectId) -> Result<Project> {
        let model = Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err("get project"))?;
        from_model(require_found(model, &format!("project {id}"))?)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Project> {
        let model = Entity::find()
            .filter(project::Column::Slug.eq(slug.to_owned()))
            .one(&self.db)
            .await
            .map_err(map_db_err("get project by slug"))?;
        from_model(require_found(model, &format!("project slug {slug}"))?)
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let models = Entity::find()
            .all(&self.db)
            .await
            .map_err(map_db_err("list projects"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn delete(&self, id: ProjectId) -> Result<()> {
        Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(map_db_err("delete project"))?;
        Ok(())
    }
}
