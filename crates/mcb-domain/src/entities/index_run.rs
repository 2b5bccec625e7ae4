//! IndexRun entity (§3): one end-to-end processing attempt, advanced
//! only by the Pipeline Orchestrator and Parse Workers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value_objects::{IndexRunId, ProjectId, SourceId};

/// Lifecycle state of an [`IndexRun`] (§4.1 "State machine").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Ordered pipeline stage, used as the `resume_cursor` value (§4.1).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display, strum_macros::EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Clone,
    Parse,
    Resolve,
    Lineage,
    GraphSync,
    Embed,
    Analytics,
}

impl RunStage {
    /// The ordered sequence of all stages (§4.1 "Stages (fixed order)").
    pub const ORDER: [Self; 7] = [
        Self::Clone,
        Self::Parse,
        Self::Resolve,
        Self::Lineage,
        Self::GraphSync,
        Self::Embed,
        Self::Analytics,
    ];

    /// The stage immediately after this one, or `None` after `analytics`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let idx = Self::ORDER.iter().position(|s| *s == self)?;
        Self::ORDER.get(idx + 1).copied()
    }
}

/// One end-to-end processing attempt for a Project (optionally scoped
/// to a Source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRun {
    pub id: IndexRunId,
    pub project_id: ProjectId,
    pub source_id: Option<SourceId>,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub files_processed: u64,
    pub symbols_found: u64,
    pub edges_found: u64,
    pub error_message: Option<String>,
    pub total_chunks: u32,
    pub chunks_remaining: u32,
    /// Last successfully completed stage; `None` before the run starts.
    pub resume_cursor: Option<RunStage>,
}

impl IndexRun {
    #[must_use]
    pub fn new(project_id: ProjectId, source_id: Option<SourceId>) -> Self {
        Self {
            id: IndexRunId::new(),
            project_id,
            source_id,
            status: RunStatus::Pending,
            started_at: None,
            completed_at: None,
            files_processed: 0,
            symbols_found: 0,
            edges_found: 0,
            error_message: None,
            total_chunks: 0,
            chunks_remaining: 0,
            resume_cursor: None,
        }
    }

    /// `pending` → `running` on first successful dequeue (§4.1).
    pub fn start(&mut self) -> Result<()> {
        self.expect_status(RunStatus::Pending)?;
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Advance `resume_cursor` after a stage completes successfully.
    pub fn advance_stage(&mut self, stage: RunStage) -> Result<()> {
        self.expect_status(RunStatus::Running)?;
        self.resume_cursor = Some(stage);
        Ok(())
    }

    /// `running` → `completed`, valid only once the analytics stage
    /// finishes and `chunks_remaining == 0` (§4.1).
    pub fn complete(&mut self) -> Result<()> {
        self.expect_status(RunStatus::Running)?;
        if self.chunks_remaining != 0 {
            return Err(Error::InvariantViolation {
                message: format!(
                    "cannot complete run {}: chunks_remaining = {}",
                    self.id, self.chunks_remaining
                ),
            });
        }
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// `running` → `failed` on any stage returning a fatal error.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(Utc::now());
    }

    /// `running` → `cancelled` on an external cancellation signal.
    pub fn cancel(&mut self) -> Result<()> {
        self.expect_status(RunStatus::Running)?;
        self.status = RunStatus::Cancelled;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Record the Parse Stage's fan-out size (§4.2).
    pub fn set_total_chunks(&mut self, total_chunks: u32) {
        self.total_chunks = total_chunks;
        self.chunks_remaining = total_chunks;
    }

    /// Conditionally decrement `chunks_remaining` (§4.3).
    ///
    /// Returns the post-decrement value. A value of zero means this
    /// call was the one that completed the chunk fan-out and the
    /// caller must emit exactly one `parse_complete` resume message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] if `chunks_remaining` is
    /// already zero, which would otherwise underflow — see §9 Open
    /// Questions: treated as fatal rather than silently clamped.
    pub fn decrement_chunks_remaining(&mut self) -> Result<u32> {
        self.chunks_remaining = self.chunks_remaining.checked_sub(1).ok_or_else(|| {
            Error::InvariantViolation {
                message: format!(
                    "chunks_remaining underflow on run {}: already at zero",
                    self.id
                ),
            }
        })?;
        Ok(self.chunks_remaining)
    }

    fn expect_status(&self, expected: RunStatus) -> Result<()> {
        if self.status != expected {
            return Err(Error::InvalidRunState {
                index_run_id: self.id.to_string(),
                actual: self.status.to_string(),
                expected: expected.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_run() -> IndexRun {
        let mut run = IndexRun::new(ProjectId::new(), None);
        run.start().unwrap();
        run
    }

    #[test]
    fn cannot_complete_with_chunks_remaining() {
        let mut run = running_run();
        run.set_total_chunks(3);
        assert!(run.complete().is_err());
    }

    #[test]
    fn completes_once_chunks_drained() {
        let mut run = running_run();
        run.set_total_chunks(1);
        assert_eq!(run.decrement_chunks_remaining().unwrap(), 0);
        assert!(run.complete().is_ok());
        assert_eq!(run.status, RunStatus::Completed);
    }

    #[test]
    fn decrement_below_zero_is_invariant_violation() {
        let mut run = running_run();
        run.set_total_chunks(1);
        run.decrement_chunks_remaining().unwrap();
        assert!(run.decrement_chunks_remaining().is_err());
    }

    #[test]
    fn cannot_start_twice() {
        let mut run = running_run();
        assert!(run.start().is_err());
    }

    #[test]
    fn stage_order_is_fixed() {
        assert_eq!(RunStage::Clone.next(), Some(RunStage::Parse));
        assert_eq!(RunStage::Analytics.next(), None);
    }
}
