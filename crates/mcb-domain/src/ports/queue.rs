//! Queue port (§2 "Q", §6): an ordered, at-least-once stream with
//! consumer groups and acknowledgements.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value_objects::{FileId, IndexRunId, ProjectId, SourceId};

/// A message on the `ingest` logical stream (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IngestMessage {
    /// Start (or resume, via `resume_from`) an index run.
    IndexRun {
        index_run_id: IndexRunId,
        project_id: ProjectId,
        source_id: Option<SourceId>,
        resume_from: Option<String>,
    },
    /// Emitted by the last Parse Worker to drain a run's chunks; tells
    /// the orchestrator it may resume stages after `parse` (§4.1, §4.3).
    ParseComplete {
        index_run_id: IndexRunId,
        project_id: ProjectId,
    },
}

/// A message on the `parse-tasks` logical stream (§6): one file chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParseTaskMessage {
    ParseChunk {
        index_run_id: IndexRunId,
        project_id: ProjectId,
        chunk_id: String,
        file_ids: Vec<FileId>,
    },
}

/// An opaque handle a consumer must pass back to [`Queue::ack`] once a
/// message has been durably processed.
#[derive(Debug, Clone)]
pub struct MessageHandle(pub String);

/// The two logical streams this system consumes/produces (§2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Ingest,
    ParseTasks,
}

/// Ordered, at-least-once message stream with consumer-group
/// acknowledgement semantics, built over `sea-streamer` (§2, §10).
#[async_trait]
pub trait Queue: Send + Sync {
    /// Publish a message as raw JSON bytes onto `stream`.
    async fn publish(&self, stream: Stream, payload: &[u8]) -> Result<()>;

    /// Receive the next unacknowledged message, blocking up to the
    /// stream's configured visibility timeout.
    async fn receive(&self, stream: Stream) -> Result<Option<(MessageHandle, Vec<u8>)>>;

    /// Acknowledge successful processing, allowing the broker to
    /// advance the consumer-group offset.
    async fn ack(&self, stream: Stream, handle: MessageHandle) -> Result<()>;
}
