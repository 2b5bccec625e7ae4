//! # Domain layer
//!
//! Core business logic and domain types for the code-knowledge-graph
//! ingestion pipeline. Contains only pure domain entities, value
//! objects, and ports — no infrastructure or application concerns.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`entities`] | Projects, Sources, Files, Symbols, SymbolEdges, IndexRuns |
//! | [`value_objects`] | Strong-typed ids, [`value_objects::Language`], [`value_objects::Confidence`] |
//! | [`ports`] | Repository, parser, queue, store, and connector interfaces |
//! | [`error`] | Shared error type |

/// Entity and value-object macros.
#[macro_use]
pub mod macros;

/// Core business entities with identity.
pub mod entities;
/// Shared error type.
pub mod error;
/// External provider and persistence port interfaces.
pub mod ports;
/// Immutable value objects.
pub mod value_objects;

pub use entities::{
    AnalyticsScope, ColumnReference, DerivationType, EdgeType, File, IndexRun, ParseErrorRecord,
    Project, ProjectAnalytics, ProjectSettings, RunStage, RunStatus, Source, SourceType, Symbol,
    SymbolEdge, SymbolEdgeMetadata, SymbolKind,
};
pub use error::{Error, Result};
pub use value_objects::{
    ColumnReferenceId, Confidence, FileId, IndexRunId, Language, ParseErrorRecordId,
    ProjectAnalyticsId, ProjectId, RawReferenceId, SourceId, SymbolEdgeId, SymbolId,
    RESOLUTION_FLOOR,
};
