//! Analytics stage (§4.8): in-memory graph metrics over a project's
//! symbol edges, plus cross-language bridge grouping.

use std::collections::HashMap;
use std::sync::Arc;

use mcb_domain::error::Result;
use mcb_domain::ports::{ProjectAnalyticsRepository, SymbolEdgeRepository, SymbolRepository};
use mcb_domain::{AnalyticsScope, ProjectAnalytics, SymbolEdge, SymbolId, SymbolKind};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::info;

use crate::use_cases::orchestrator::RunContext;

/// Batch page size for fetching the project's edge list (§4.8).
const EDGE_PAGE_SIZE: usize = 500;
/// Fixed PageRank iteration count (§4.8).
const PAGERANK_ITERATIONS: usize = 20;
/// PageRank damping factor (§4.8).
const DAMPING: f64 = 0.85;

fn base_layer(kind: SymbolKind) -> &'static str {
    if kind.is_data() {
        "data"
    } else if kind.is_web() {
        "api"
    } else if matches!(
        kind,
        SymbolKind::OrmMapping | SymbolKind::ConnectionString | SymbolKind::ConfigEntry
    ) {
        "infrastructure"
    } else {
        "business"
    }
}

/// Computes degree, PageRank, architectural layer, and cross-language
/// bridge counts for a project, persisting into symbol metadata and
/// `project_analytics` (§4.8).
pub struct AnalyticsStage {
    symbols: Arc<dyn SymbolRepository>,
    edges: Arc<dyn SymbolEdgeRepository>,
    analytics: Arc<dyn ProjectAnalyticsRepository>,
}

impl AnalyticsStage {
    #[must_use]
    pub fn new(
        symbols: Arc<dyn SymbolRepository>,
        edges: Arc<dyn SymbolEdgeRepository>,
        analytics: Arc<dyn ProjectAnalyticsRepository>,
    ) -> Self {
        Self {
            symbols,
            edges,
            analytics,
        }
    }

    pub async fn run(&self, ctx: &RunContext) -> Result<()> {
        let symbols = self.symbols.list_for_project(ctx.project_id).await?;
        if symbols.is_empty() {
            return Ok(());
        }
        let all_edges = self.fetch_all_edges(ctx.project_id).await?;

        let mut graph: DiGraph<SymbolId, ()> = DiGraph::new();
        let mut node_of: HashMap<SymbolId, NodeIndex> = HashMap::new();
        for symbol in &symbols {
            let idx = graph.add_node(symbol.id);
            node_of.insert(symbol.id, idx);
        }
        for edge in &all_edges {
            if let (Some(&src), Some(&dst)) = (
                node_of.get(&edge.source_symbol_id),
                node_of.get(&edge.target_symbol_id),
            ) {
                graph.add_edge(src, dst, ());
            }
        }

        let ranks = pagerank(&graph);
        let bridge_counts = bridge_grouping(&symbols, &all_edges);

        let mut patches = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            let idx = node_of[&symbol.id];
            let in_degree = graph.neighbors_directed(idx, petgraph::Direction::Incoming).count();
            let out_degree = graph.neighbors_directed(idx, petgraph::Direction::Outgoing).count();
            let participates_cross_lang = all_edges.iter().any(|e| {
                (e.source_symbol_id == symbol.id || e.target_symbol_id == symbol.id)
                    && e.metadata.is_cross_lang()
            });
            let layer = if in_degree == 0 && out_degree == 0 {
                "unknown"
            } else if participates_cross_lang {
                "cross-cutting"
            } else {
                base_layer(symbol.kind)
            };
            patches.push((
                symbol.id,
                serde_json::json!({
                    "in_degree": in_degree,
                    "out_degree": out_degree,
                    "pagerank": ranks.get(&idx).copied().unwrap_or(0.0),
                    "layer": layer,
                }),
            ));
        }
        if !patches.is_empty() {
            self.symbols.patch_metadata_batch(&patches).await?;
        }

        let mut project_rows = vec![ProjectAnalytics::new(
            ctx.project_id,
            AnalyticsScope::Project,
            ctx.project_id.to_string(),
            serde_json::json!({
                "symbol_count": symbols.len(),
                "edge_count": all_edges.len(),
            }),
        )];
        for (key, count) in &bridge_counts {
            project_rows.push(ProjectAnalytics::new(
                ctx.project_id,
                AnalyticsScope::Bridge,
                key.clone(),
                serde_json::json!({ "count": count }),
            ));
        }
        self.analytics.upsert_batch(&project_rows).await?;

        info!(
            project_id = %ctx.project_id,
            symbols = symbols.len(),
            edges = all_edges.len(),
            bridges = bridge_counts.len(),
            "analytics stage complete"
        );
        Ok(())
    }

    async fn fetch_all_edges(&self, project_id: mcb_domain::ProjectId) -> Result<Vec<SymbolEdge>> {
        let mut all = Vec::new();
        let mut offset = 0usize;
        loop {
            let page = self
                .edges
                .list_for_project_batched(project_id, EDGE_PAGE_SIZE, offset)
                .await?;
            if page.is_empty() {
                break;
            }
            let got = page.len();
            all.extend(page);
            offset += EDGE_PAGE_SIZE;
            if got < EDGE_PAGE_SIZE {
                break;
            }
        }
        Ok(all)
    }
}

/// Damped PageRank over `graph`, `PAGERANK_ITERATIONS` power-iteration
/// rounds at damping `DAMPING` (§4.8).
fn pagerank(graph: &DiGraph<SymbolId, ()>) -> HashMap<NodeIndex, f64> {
    let n = graph.node_count();
    if n == 0 {
        return HashMap::new();
    }
    let base = (1.0 - DAMPING) / n as f64;
    let mut ranks: HashMap<NodeIndex, f64> =
        graph.node_indices().map(|idx| (idx, 1.0 / n as f64)).collect();

    for _ in 0..PAGERANK_ITERATIONS {
        let mut next: HashMap<NodeIndex, f64> = graph.node_indices().map(|idx| (idx, base)).collect();
        for idx in graph.node_indices() {
            let out_degree = graph
                .neighbors_directed(idx, petgraph::Direction::Outgoing)
                .count();
            if out_degree == 0 {
                continue;
            }
            let share = DAMPING * ranks[&idx] / out_degree as f64;
            for target in graph.neighbors_directed(idx, petgraph::Direction::Outgoing) {
                *next.get_mut(&target).expect("node exists") += share;
            }
        }
        ranks = next;
    }
    ranks
}

/// Groups edges by `(src_lang, tgt_lang, edge_type)`, returning a
/// `"<srclang>→<tgtlang>:<edge_type>"`-keyed count map (§4.8).
fn bridge_grouping(
    symbols: &[mcb_domain::Symbol],
    edges: &[SymbolEdge],
) -> HashMap<String, usize> {
    let by_id: HashMap<SymbolId, &mcb_domain::Symbol> = symbols.iter().map(|s| (s.id, s)).collect();
    let mut counts = HashMap::new();
    for edge in edges {
        if !edge.metadata.is_cross_lang() {
            continue;
        }
        let (Some(src), Some(dst)) = (by_id.get(&edge.source_symbol_id), by_id.get(&edge.target_symbol_id)) else {
            continue;
        };
        let key = format!("{}→{}:{}", src.language, dst.language, edge.edge_type);
        *counts.entry(key).or_insert(0usize) += 1;
    }
    counts
}
