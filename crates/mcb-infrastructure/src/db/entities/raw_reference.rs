use sea_orm::entity::prelude::*;

/// Resolver working queue (§4.3 "Reference Resolution"): one row per
/// unresolved reference a parser emitted, consumed and deleted as the
/// resolver matches it against `symbols`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "raw_references")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(indexed)]
    pub project_id: String,
    #[sea_orm(indexed)]
    pub file_id: String,
    pub language: String,
    pub from_symbol: Option<String>,
    pub to_name: String,
    pub to_qualified: Option<String>,
    pub reference_type: String,
    pub confidence: f64,
    pub context: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
