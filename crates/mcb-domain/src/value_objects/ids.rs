//! Strong-typed UUID identifiers for all domain entities (§3).

define_id!(ProjectId, "Strong typed identifier for a project");
define_id!(SourceId, "Strong typed identifier for a source");
define_id!(FileId, "Strong typed identifier for a file");
define_id!(SymbolId, "Strong typed identifier for a symbol");
define_id!(SymbolEdgeId, "Strong typed identifier for a symbol edge");
define_id!(
    ColumnReferenceId,
    "Strong typed identifier for a column reference"
);
define_id!(IndexRunId, "Strong typed identifier for an index run");
define_id!(
    ParseErrorRecordId,
    "Strong typed identifier for a parse error record"
);
define_id!(
    ProjectAnalyticsId,
    "Strong typed identifier for a project analytics snapshot"
);
define_id!(
    RawReferenceId,
    "Strong typed identifier for a staged raw reference awaiting resolution"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn from_name_is_deterministic() {
        assert_eq!(
            ProjectId::from_name("acme/widgets"),
            ProjectId::from_name("acme/widgets")
        );
    }

    #[test]
    fn different_id_types_namespace_separately() {
        let project = ProjectId::from_name("acme/widgets");
        let source = SourceId::from_name("acme/widgets");
        assert_ne!(project.inner(), source.inner());
    }

    #[test]
    fn round_trips_through_display_and_from_str() {
        let id = FileId::new();
        let parsed = FileId::from_str(&id.to_string()).expect("valid uuid text");
        assert_eq!(id, parsed);
    }
}
