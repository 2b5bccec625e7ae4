//! Value objects: small, validated, immutable types shared across
//! entities and ports.

mod confidence;
mod ids;
mod language;

pub use confidence::{Confidence, RESOLUTION_FLOOR};
pub use ids::{
    ColumnReferenceId, FileId, IndexRunId, ParseErrorRecordId, ProjectAnalyticsId, ProjectId,
    RawReferenceId, SourceId, SymbolEdgeId, SymbolId,
};
pub use language::Language;
