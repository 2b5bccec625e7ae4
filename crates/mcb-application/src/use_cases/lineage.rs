//! Lineage stage (§4.6): resolves a run's staged `ColumnReference` rows
//! against the project's Symbol table and emits column-lineage edges.

use std::collections::HashMap;
use std::sync::Arc;

use mcb_domain::error::Result;
use mcb_domain::ports::{ColumnReferenceRepository, SymbolEdgeRepository, SymbolRepository};
use mcb_domain::{DerivationType, EdgeType, Symbol, SymbolEdge, SymbolEdgeMetadata};
use tracing::{info, warn};

use crate::use_cases::orchestrator::RunContext;

fn edge_type_for(derivation: DerivationType) -> EdgeType {
    match derivation {
        DerivationType::DirectCopy => EdgeType::DirectCopy,
        DerivationType::TransformsTo | DerivationType::Aggregates | DerivationType::Expression => {
            EdgeType::TransformsTo
        }
    }
}

/// Consumes one run's ephemeral `ColumnReference` rows into durable
/// `SymbolEdge`s, then clears the staging table (§4.6).
pub struct LineageStage {
    column_references: Arc<dyn ColumnReferenceRepository>,
    symbols: Arc<dyn SymbolRepository>,
    edges: Arc<dyn SymbolEdgeRepository>,
}

impl LineageStage {
    #[must_use]
    pub fn new(
        column_references: Arc<dyn ColumnReferenceRepository>,
        symbols: Arc<dyn SymbolRepository>,
        edges: Arc<dyn SymbolEdgeRepository>,
    ) -> Self {
        Self {
            column_references,
            symbols,
            edges,
        }
    }

    pub async fn run(&self, ctx: &RunContext) -> Result<()> {
        let references = self
            .column_references
            .list_for_run(ctx.index_run_id)
            .await?;
        if references.is_empty() {
            return Ok(());
        }

        let mut fqns: Vec<String> = references
            .iter()
            .flat_map(|r| [r.source_column_fqn.clone(), r.target_column_fqn.clone()])
            .collect();
        fqns.sort_unstable();
        fqns.dedup();

        let found = self
            .symbols
            .find_by_qualified_names(ctx.project_id, &fqns)
            .await?;
        let index: HashMap<&str, &Symbol> =
            found.iter().map(|s| (s.qualified_name.as_str(), s)).collect();

        let mut batch = Vec::with_capacity(references.len());
        let mut dropped = 0usize;
        for reference in &references {
            let (Some(source), Some(target)) = (
                index.get(reference.source_column_fqn.as_str()),
                index.get(reference.target_column_fqn.as_str()),
            ) else {
                dropped += 1;
                continue;
            };
            match SymbolEdge::new(
                ctx.project_id,
                source.id,
                target.id,
                edge_type_for(reference.derivation_type),
                SymbolEdgeMetadata::column_lineage(reference.derivation_type, reference.expression.clone()),
            ) {
                Ok(edge) => batch.push(edge),
                Err(err) => warn!(error = %err, "dropping invalid lineage edge"),
            }
        }

        if dropped > 0 {
            warn!(
                index_run_id = %ctx.index_run_id,
                dropped,
                "column references with unresolved endpoints discarded"
            );
        }
        if !batch.is_empty() {
            self.edges.upsert_batch(&batch).await?;
        }
        self.column_references
            .delete_for_run(ctx.index_run_id)
            .await?;
        info!(
            index_run_id = %ctx.index_run_id,
            emitted = batch.len(),
            dropped,
            "lineage stage complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_copy_and_transforms_map_distinctly() {
        assert_eq!(edge_type_for(DerivationType::DirectCopy), EdgeType::DirectCopy);
        assert_eq!(edge_type_for(DerivationType::TransformsTo), EdgeType::TransformsTo);
        assert_eq!(edge_type_for(DerivationType::Aggregates), EdgeType::TransformsTo);
        assert_eq!(edge_type_for(DerivationType::Expression), EdgeType::TransformsTo);
    }
}
