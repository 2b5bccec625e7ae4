use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "symbol_edges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub project_id: String,
    #[sea_orm(indexed)]
    pub source_symbol_id: String,
    #[sea_orm(indexed)]
    pub target_symbol_id: String,
    pub edge_type: String,
    pub confidence: f64,
    pub match_strategy: String,
    pub bridge: Option<String>,
    pub derivation_type: Option<String>,
    pub expression: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
