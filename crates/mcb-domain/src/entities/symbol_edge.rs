//! SymbolEdge entity (§3): a directed edge between two Symbols.

use serde::{Deserialize, Serialize};

use crate::entities::DerivationType;
use crate::value_objects::{Confidence, ProjectId, SymbolEdgeId, SymbolId};

/// Semantic label for a [`SymbolEdge`] (§3: "~25 semantic labels").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Calls,
    CallsApi,
    ReadsFrom,
    WritesTo,
    UsesTable,
    UsesColumn,
    Inherits,
    Implements,
    Extends,
    Overrides,
    Instantiates,
    References,
    Imports,
    Exports,
    Declares,
    Contains,
    HasParameterType,
    ReturnsType,
    Triggers,
    DependsOn,
    MapsTo,
    RoutesTo,
    BindsTo,
    TransformsTo,
    DirectCopy,
}

impl EdgeType {
    /// Whether this edge type is one of the column-level lineage edges
    /// the Lineage stage (§4.6) and Graph Sync (§4.7) treat specially.
    #[must_use]
    pub fn is_column_lineage(self) -> bool {
        matches!(self, Self::TransformsTo | Self::DirectCopy)
    }
}

/// Cross-language resolution provenance attached to a [`SymbolEdge`]
/// (§4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEdgeMetadata {
    pub confidence: Confidence,
    pub match_strategy: String,
    /// `"<srclang>→<tgtlang>"`, set only for cross-language bridge
    /// matches (strategy 5).
    pub bridge: Option<String>,
    /// How the target column derives from the source column; set only
    /// on column-lineage edges (`transforms_to`/`direct_copy`), carried
    /// over from the `ColumnReference` the Lineage stage consumed it
    /// from (§4.6, §6 graph schema's `COLUMN_FLOW` relationship).
    #[serde(default)]
    pub derivation_type: Option<DerivationType>,
    /// The source expression behind a column-lineage edge, when known.
    #[serde(default)]
    pub expression: Option<String>,
}

impl SymbolEdgeMetadata {
    /// Metadata for a same-file or same-language exact match
    /// (strategies 1-4, §4.5).
    #[must_use]
    pub fn exact() -> Self {
        Self {
            confidence: Confidence::EXACT,
            match_strategy: "exact".to_owned(),
            bridge: None,
            derivation_type: None,
            expression: None,
        }
    }

    /// Metadata for a column-lineage edge emitted by the Lineage stage,
    /// carrying the originating `ColumnReference`'s derivation details.
    #[must_use]
    pub fn column_lineage(derivation_type: DerivationType, expression: Option<String>) -> Self {
        Self {
            confidence: Confidence::EXACT,
            match_strategy: "exact".to_owned(),
            bridge: None,
            derivation_type: Some(derivation_type),
            expression,
        }
    }

    /// Whether this edge should be flagged cross-language for reporting
    /// (§4.5: "If confidence < 1.0 or match_strategy ≠ exact").
    #[must_use]
    pub fn is_cross_lang(&self) -> bool {
        self.confidence.value() < 1.0 || self.match_strategy != "exact"
    }
}

/// A directed edge between two Symbols in the same Project.
///
/// Invariant (§3): `(project, source, target, edge_type)` is unique;
/// self-edges MUST NOT be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEdge {
    pub id: SymbolEdgeId,
    pub project_id: ProjectId,
    pub source_symbol_id: SymbolId,
    pub target_symbol_id: SymbolId,
    pub edge_type: EdgeType,
    pub metadata: SymbolEdgeMetadata,
}

impl SymbolEdge {
    /// Build an edge, rejecting self-edges per the §3 invariant.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::InvalidArgument`] if `source` and
    /// `target` are the same symbol.
    pub fn new(
        project_id: ProjectId,
        source_symbol_id: SymbolId,
        target_symbol_id: SymbolId,
        edge_type: EdgeType,
        metadata: SymbolEdgeMetadata,
    ) -> crate::error::Result<Self> {
        if source_symbol_id == target_symbol_id {
            return Err(crate::error::Error::InvalidArgument {
                message: format!("self-edge rejected: {source_symbol_id} {edge_type}"),
            });
        }
        Ok(Self {
            id: Self::identity_id(project_id, source_symbol_id, target_symbol_id, edge_type),
            project_id,
            source_symbol_id,
            target_symbol_id,
            edge_type,
            metadata,
        })
    }

    /// Deterministic identity key honoring the `(project, source, target,
    /// edge_type)` uniqueness invariant.
    #[must_use]
    pub fn identity_id(
        project_id: ProjectId,
        source_symbol_id: SymbolId,
        target_symbol_id: SymbolId,
        edge_type: EdgeType,
    ) -> SymbolEdgeId {
        SymbolEdgeId::from_name(&format!(
            "{project_id}:{source_symbol_id}:{target_symbol_id}:{edge_type}"
        ))
    }
}
