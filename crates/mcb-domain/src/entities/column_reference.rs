//! ColumnReference entity (§3): ephemeral column-to-column lineage
//! facts consumed by the Lineage stage (§4.6).

use serde::{Deserialize, Serialize};

use crate::value_objects::{IndexRunId, ProjectId};

/// How a target column's value derives from a source column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DerivationType {
    DirectCopy,
    TransformsTo,
    Aggregates,
    Expression,
}

/// A raw column-to-column lineage fact captured during parse.
///
/// Scoped to an [`crate::entities::IndexRun`]; rows are deleted once the
/// Lineage stage (§4.6) consumes them into [`crate::entities::SymbolEdge`]
/// rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReference {
    pub project_id: ProjectId,
    pub index_run_id: IndexRunId,
    pub source_column_fqn: String,
    pub target_column_fqn: String,
    pub derivation_type: DerivationType,
    pub expression: Option<String>,
    pub line: u32,
}

impl ColumnReference {
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        index_run_id: IndexRunId,
        source_column_fqn: impl Into<String>,
        target_column_fqn: impl Into<String>,
        derivation_type: DerivationType,
        line: u32,
    ) -> Self {
        Self {
            project_id,
            index_run_id,
            source_column_fqn: source_column_fqn.into(),
            target_column_fqn: target_column_fqn.into(),
            derivation_type,
            expression: None,
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_type_strum_round_trips() {
        use std::str::FromStr;
        assert_eq!(
            DerivationType::from_str("direct_copy").unwrap(),
            DerivationType::DirectCopy
        );
        assert_eq!(DerivationType::TransformsTo.to_string(), "transforms_to");
    }
}
