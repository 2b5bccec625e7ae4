use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use mcb_domain::entities::{Symbol, SymbolKind};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::SymbolRepository;
use mcb_domain::value_objects::{FileId, Language, ProjectId, SymbolId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::db::entities::symbol::{self, ActiveModel, Entity};
use crate::db::repos::common::{from_json, map_db_err, parse_id, require_found, to_json};

pub struct SeaOrmSymbolRepository {
    db: DatabaseConnection,
}

impl SeaOrmSymbolRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active(symbol: &Symbol) -> Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(symbol.id.to_string()),
        project_id: Set(symbol.project_id.to_string()),
        file_id: Set(symbol.file_id.to_string()),
        name: Set(symbol.name.clone()),
        qualified_name: Set(symbol.qualified_name.clone()),
        kind: Set(symbol.kind.to_string()),
        language: Set(symbol.language.tag().to_owned()),
        start_line: Set(symbol.start_line as i32),
        end_line: Set(symbol.end_line as i32),
        start_col: Set(symbol.start_col as i32),
        end_col: Set(symbol.end_col as i32),
        signature: Set(symbol.signature.clone()),
        doc_comment: Set(symbol.doc_comment.clone()),
        metadata: Set(to_json("symbol metadata", &symbol.metadata)?),
    })
}

fn from_model(model: symbol::Model) -> Result<Symbol> {
    Ok(Symbol {
        id: parse_id("symbol", &model.id)?,
        project_id: parse_id("symbol.project_id", &model.project_id)?,
        file_id: parse_id("symbol.file_id", &model.file_id)?,
        name: model.name,
        qualified_name: model.qualified_name,
        kind: SymbolKind::from_str(&model.kind)
            .map_err(|_| Error::storage_permanent(format!("unknown symbol kind {}", model.kind)))?,
        language: Language::from_tag(&model.language)
            .ok_or_else(|| Error::storage_permanent(format!("unknown language {}", model.language)))?,
        start_line: model.start_line as u32,
        end_line: model.end_line as u32,
        start_col: model.start_col as u32,
        end_col: model.end_col as u32,
        signature: model.signature,
        doc_comment: model.doc_comment,
        metadata: from_json::<BTreeMap<String, serde_json::Value>>("symbol metadata", model.metadata)?,
    })
}

fn upsert_on_conflict() -> sea_orm::sea_query::OnConflict {
    sea_orm::sea_query::OnConflict::column(symbol::Column::Id)
        .update_columns([
            symbol::Column::Name,
            symbol::Column::QualifiedName,
            symbol::Column::StartLine,
            symbol::Column::EndLine,
            symbol::Column::StartCol,
            symbol::Column::EndCol,
            symbol::Column::Signature,
            symbol::Column::DocComment,
            symbol::Column::Metadata,
        ])
        .to_owned()
}

#[async_trait]
impl SymbolRepository for SeaOrmSymbolRepository {
    async fn upsert(&self, symbol: &Symbol) -> Result<()> {
        let active = to_active(symbol)?;
        Entity::insert(active)
            .on_conflict(upsert_on_conflict())
            .exec(&self.db)
            .await
            .map_err(map_db_err("upsert symbol"))?;
        Ok(())
    }

    async fn upsert_batch(&self, symbols: &[Symbol]) -> Result<()> {
        if symbols.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await.map_err(map_db_err("begin symbol batch"))?;
        for symbol in symbols {
            let active = to_active(symbol)?;
            Entity::insert(active)
                .on_conflict(upsert_on_conflict())
                .exec(&txn)
                .await
                .map_err(map_db_err("upsert symbol batch"))?;
        }
        txn.commit().await.map_err(map_db_err("commit symbol batch"))?;
        Ok(())
    }

    async fn get(&self, id: SymbolId) -> Result<Symbol> {
        let model = Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(map_db_err("get symbol"))?;
        from_model(require_found(model, &format!("symbol {id}"))?)
    }

    async fn find_by_qualified_names(
        &self,
        project_id: ProjectId,
        qualified_names: &[String],
    ) -> Result<Vec<Symbol>> {
        if qualified_names.is_empty() {
            return Ok(Vec::new());
        }
        let models = Entity::find()
            .filter(symbol::Column::ProjectId.eq(project_id.to_string()))
            .filter(symbol::Column::QualifiedName.is_in(qualified_names.to_vec()))
            .all(&self.db)
            .await
            .map_err(map_db_err("find symbols by qualified names"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn find_by_short_names(
        &self,
        project_id: ProjectId,
        short_names: &[String],
    ) -> Result<Vec<Symbol>> {
        if short_names.is_empty() {
            return Ok(Vec::new());
        }
        let models = Entity::find()
            .filter(symbol::Column::ProjectId.eq(project_id.to_string()))
            .filter(symbol::Column::Name.is_in(short_names.to_vec()))
            .all(&self.db)
            .await
            .map_err(map_db_err("find symbols by short names"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn list_for_file(&self, file_id: FileId) -> Result<Vec<Symbol>> {
        let models = Entity::find()
            .filter(symbol::Column::FileId.eq(file_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list symbols for file"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<Symbol>> {
        let models = Entity::find()
            .filter(symbol::Column::ProjectId.eq(project_id.to_string()))
            .all(&self.db)
            .await
            .map_err(map_db_err("list symbols for project"))?;
        models.into_iter().map(from_model).collect()
    }

    async fn patch_metadata_batch(&self, patches: &[(SymbolId, serde_json::Value)]) -> Result<()> {
        if patches.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await.map_err(map_db_err("begin metadata patch"))?;
        for (id, patch) in patches {
            let model = Entity::find_by_id(id.to_string())
                .one(&txn)
                .await
                .map_err(map_db_err("load symbol for metadata patch"))?;
            let Some(model) = model else { continue };
            let mut metadata =
                from_json::<BTreeMap<String, serde_json::Value>>("symbol metadata", model.metadata.clone())?;
            if let serde_json::Value::Object(patch_map) = patch {
                for (key, value) in patch_map {
                    metadata.insert(key.clone(), value.clone());
                }
            }
            let mut active: ActiveModel = model.into();
            active.metadata = Set(to_json("symbol metadata", &metadata)?);
            active
                .update(&txn)
                .await
                .map_err(map_db_err("apply symbol metadata patch"))?;
        }
        txn.commit().await.map_err(map_db_err("commit metadata patch"))?;
        Ok(())
    }
}
