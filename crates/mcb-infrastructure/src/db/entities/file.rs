use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub project_id: String,
    #[sea_orm(indexed)]
    pub source_id: String,
    pub path: String,
    pub language: Option<String>,
    pub size_bytes: i64,
    pub content_hash: String,
    pub last_indexed_at: Option<DateTime<Utc>>,
    pub skip_column_lineage: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
