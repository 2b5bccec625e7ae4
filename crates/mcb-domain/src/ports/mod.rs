//! Ports (§2, §6): the interfaces the application layer's use cases
//! depend on, implemented by the infrastructure and providers layers.

mod blob_store;
mod connector;
mod embedder;
mod graph_store;
mod parser;
mod queue;
mod repositories;

pub use blob_store::BlobStore;
pub use connector::{Connector, FetchOutcome};
#[cfg(feature = "mock")]
pub use connector::MockConnector;
pub use embedder::{Embedder, EmbeddingInput, EmbeddingOutput};
#[cfg(feature = "mock")]
pub use embedder::MockEmbedder;
pub use graph_store::{GraphStore, GraphSyncBatch};
pub use parser::{
    FileInput, ParseErrorEntry, ParseResult, Parser, ParserRegistration, RawColumnReference,
    RawReference, RawReferenceRecord, RawSymbol,
};
pub use queue::{IngestMessage, MessageHandle, ParseTaskMessage, Queue, Stream};
pub use repositories::{
    ColumnReferenceRepository, FileRepository, IndexRunRepository, ParseErrorRepository,
    ProjectAnalyticsRepository, ProjectRepository, RawReferenceRepository, SourceRepository,
    SymbolEdgeRepository, SymbolRepository,
};
