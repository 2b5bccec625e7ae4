//! Cross-Language Resolver (XR, §4.5): rewrites staged
//! [`mcb_domain::ports::RawReferenceRecord`] rows into concrete
//! `SymbolEdge`s using an ordered strategy pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use mcb_domain::error::Result;
use mcb_domain::ports::{RawReferenceRepository, SymbolEdgeRepository, SymbolRepository};
use mcb_domain::{EdgeType, Symbol, SymbolEdge, SymbolEdgeMetadata};
use tracing::{info, warn};

use crate::use_cases::bridge_rules::{api_route_match, resolve_bridge};
use crate::use_cases::orchestrator::RunContext;

/// Resolves a project's staged raw references into `SymbolEdge` rows.
///
/// Performance discipline (§4.5): never loads the entire project
/// symbol set. Issues two batched lookups (by-FQN, by-short-name)
/// keyed to the deduplicated sets of names actually referenced.
pub struct ResolveStage {
    raw_references: Arc<dyn RawReferenceRepository>,
    symbols: Arc<dyn SymbolRepository>,
    edges: Arc<dyn SymbolEdgeRepository>,
}

impl ResolveStage {
    #[must_use]
    pub fn new(
        raw_references: Arc<dyn RawReferenceRepository>,
        symbols: Arc<dyn SymbolRepository>,
        edges: Arc<dyn SymbolEdgeRepository>,
    ) -> Self {
        Self {
            raw_references,
            symbols,
            edges,
        }
    }

    pub async fn run(&self, ctx: &RunContext) -> Result<()> {
        let staged = self.raw_references.list_for_project(ctx.project_id).await?;
        if staged.is_empty() {
            return Ok(());
        }

        let fqn_candidates: Vec<String> = staged
            .iter()
            .filter_map(|r| r.to_qualified.clone())
            .collect();
        let short_name_candidates: Vec<String> =
            staged.iter().map(|r| r.to_name.clone()).collect();

        let by_fqn = self
            .symbols
            .find_by_qualified_names(ctx.project_id, &dedup(fqn_candidates))
            .await?;
        let by_short_name = self
            .symbols
            .find_by_short_names(ctx.project_id, &dedup(short_name_candidates))
            .await?;

        let fqn_index = index_by(&by_fqn, |s| s.qualified_name.clone());
        let short_name_index = index_by_multi(&by_short_name, |s| s.name.clone());

        let mut resolved_edges = Vec::new();
        let mut resolved_ids = Vec::new();
        let mut unresolved = 0usize;

        for record in &staged {
            let Some(from_symbol) = record.from_symbol.or_else(|| {
                // Annotation-only reference (§4.5): infer the source as
                // the first symbol in the file by FQN, deterministically.
                (record.reference_type == EdgeType::UsesTable)
                    .then(|| first_symbol_in_file(&by_fqn, &by_short_name, record.file_id))
                    .flatten()
            }) else {
                unresolved += 1;
                continue;
            };

            let target = resolve_target(
                record,
                &fqn_index,
                &short_name_index,
                &by_fqn,
                &by_short_name,
            );

            let Some((target_symbol, metadata)) = target else {
                unresolved += 1;
                continue;
            };

            if from_symbol == target_symbol.id {
                continue;
            }

            match SymbolEdge::new(
                ctx.project_id,
                from_symbol,
                target_symbol.id,
                record.reference_type,
                metadata,
            ) {
                Ok(edge) => {
                    resolved_edges.push(edge);
                    resolved_ids.push(record.id);
                }
                Err(err) => warn!(error = %err, "skipping invalid edge"),
            }
        }

        if !resolved_edges.is_empty() {
            self.edges.upsert_batch(&resolved_edges).await?;
        }
        if !resolved_ids.is_empty() {
            self.raw_references.delete_batch(&resolved_ids).await?;
        }
        info!(
            project_id = %ctx.project_id,
            resolved = resolved_edges.len(),
            unresolved,
            "resolve stage complete"
        );
        Ok(())
    }
}

fn dedup(mut values: Vec<String>) -> Vec<String> {
    values.sort_unstable();
    values.dedup();
    values
}

fn index_by(symbols: &[Symbol], key: impl Fn(&Symbol) -> String) -> HashMap<String, Symbol> {
    symbols.iter().map(|s| (key(s), s.clone())).collect()
}

fn index_by_multi(
    symbols: &[Symbol],
    key: impl Fn(&Symbol) -> String,
) -> HashMap<String, Vec<Symbol>> {
    let mut map: HashMap<String, Vec<Symbol>> = HashMap::new();
    for symbol in symbols {
        map.entry(key(symbol)).or_default().push(symbol.clone());
    }
    map
}

fn first_symbol_in_file(
    by_fqn: &[Symbol],
    by_short_name: &[Symbol],
    file_id: mcb_domain::FileId,
) -> Option<mcb_domain::SymbolId> {
    by_fqn
        .iter()
        .chain(by_short_name.iter())
        .filter(|s| s.file_id == file_id)
        .min_by(|a, b| a.qualified_name.cmp(&b.qualified_name))
        .map(|s| s.id)
}

/// Try strategies 1-5 in order (§4.5): exact project FQN, file-local
/// FQN, unambiguous short name, case-insensitive short name, then
/// cross-language bridge rules.
fn resolve_target(
    record: &mcb_domain::ports::RawReferenceRecord,
    fqn_index: &HashMap<String, Symbol>,
    short_name_index: &HashMap<String, Vec<Symbol>>,
    by_fqn: &[Symbol],
    by_short_name: &[Symbol],
) -> Option<(Symbol, SymbolEdgeMetadata)> {
    // Strategy 1 & 2: exact FQN match (project-wide, covers file-local too).
    if let Some(fqn) = &record.to_qualified {
        if let Some(symbol) = fqn_index.get(fqn) {
            return Some((symbol.clone(), SymbolEdgeMetadata::exact()));
        }
    }

    // Strategy 3: unambiguous short-name match.
    if let Some(candidates) = short_name_index.get(&record.to_name) {
        if candidates.len() == 1 {
            return Some((candidates[0].clone(), SymbolEdgeMetadata::exact()));
        }
    }

    // Strategy 4: case-insensitive short-name match (SQL dialects).
    if record.language.is_sql_dialect() {
        let lower = record.to_name.to_lowercase();
        if let Some(symbol) = by_short_name
            .iter()
            .find(|s| s.name.to_lowercase() == lower)
        {
            return Some((
                symbol.clone(),
                SymbolEdgeMetadata {
                    confidence: mcb_domain::Confidence::EXACT,
                    match_strategy: "case_insensitive".to_owned(),
                    bridge: None,
                    derivation_type: None,
                    expression: None,
                },
            ));
        }
    }

    // Strategy 5: cross-language bridge rules. `calls_api` compares
    // normalized HTTP routes rather than symbol names (§4.5).
    by_fqn
        .iter()
        .chain(by_short_name.iter())
        .find_map(|candidate| {
            if candidate.language == record.language {
                return None;
            }
            let bridge = if record.reference_type == EdgeType::CallsApi {
                let signature = candidate.signature.as_deref().unwrap_or(&candidate.name);
                api_route_match(&record.to_name, signature)
            } else {
                resolve_bridge(record.language, &candidate.name, &record.to_name)
            }?;
            Some((
                candidate.clone(),
                SymbolEdgeMetadata {
                    confidence: bridge.confidence,
                    match_strategy: bridge.match_strategy.to_owned(),
                    bridge: Some(format!("{}→{}", record.language, candidate.language)),
                    derivation_type: None,
                    expression: None,
                },
            ))
        })
        .filter(|(_, metadata)| metadata.confidence.meets_resolution_floor())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcb_domain::{FileId, Language, ProjectId, SymbolKind};

    fn symbol(project_id: ProjectId, file_id: FileId, name: &str, qn: &str, lang: Language) -> Symbol {
        Symbol::new(project_id, file_id, name, qn, SymbolKind::Table, lang, 1, 1)
    }

    #[test]
    fn exact_fqn_beats_bridge_rules() {
        let project_id = ProjectId::new();
        let file_id = FileId::new();
        let exact = symbol(project_id, file_id, "Users", "dbo.Users", Language::TSql);
        let mut fqn_index = HashMap::new();
        fqn_index.insert(exact.qualified_name.clone(), exact.clone());

        let record = mcb_domain::ports::RawReferenceRecord {
            id: mcb_domain::value_objects::RawReferenceId::new(),
            project_id,
            file_id,
            language: Language::TSql,
            from_symbol: None,
            to_name: "Users".to_owned(),
            to_qualified: Some("dbo.Users".to_owned()),
            reference_type: EdgeType::UsesTable,
            confidence: mcb_domain::Confidence::EXACT,
            context: serde_json::Value::Null,
        };
        let (matched, metadata) =
            resolve_target(&record, &fqn_index, &HashMap::new(), &[exact], &[]).unwrap();
        assert_eq!(matched.qualified_name, "dbo.Users");
        assert_eq!(metadata.match_strategy, "exact");
    }

    #[test]
    fn below_floor_bridge_match_is_dropped() {
        let project_id = ProjectId::new();
        let file_id = FileId::new();
        // orm_convention yields 0.70, which meets the floor exactly.
        let candidate = symbol(project_id, file_id, "Users", "Users", Language::CSharp);
        let record = mcb_domain::ports::RawReferenceRecord {
            id: mcb_domain::value_objects::RawReferenceId::new(),
            project_id,
            file_id,
            language: Language::TSql,
            from_symbol: None,
            to_name: "User".to_owned(),
            to_qualified: None,
            reference_type: EdgeType::UsesTable,
            confidence: mcb_domain::Confidence::EXACT,
            context: serde_json::Value::Null,
        };
        let result = resolve_target(
            &record,
            &HashMap::new(),
            &HashMap::new(),
            &[],
            std::slice::from_ref(&candidate),
        );
        assert!(result.is_some());
        assert!(result.unwrap().1.confidence.meets_resolution_floor());
    }
}
