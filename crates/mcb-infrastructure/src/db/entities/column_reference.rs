use sea_orm::entity::prelude::*;

/// `ColumnReference` carries no identity in the domain model — lineage
/// rows are looked up by `(project_id, index_run_id)`, never by id — so
/// this table generates a synthetic UUID primary key on insert.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "column_references")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub project_id: String,
    #[sea_orm(indexed)]
    pub index_run_id: String,
    pub source_column_fqn: String,
    pub target_column_fqn: String,
    pub derivation_type: String,
    pub expression: Option<String>,
    pub line: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
