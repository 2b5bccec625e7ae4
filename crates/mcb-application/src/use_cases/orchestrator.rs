//! Pipeline Orchestrator (PO, §4.1): advances an `IndexRun` through its
//! ordered stages, persisting progress after every stage so a crash
//! restart resumes cleanly from `resume_cursor`.

use std::path::PathBuf;
use std::sync::Arc;

use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{
    BlobStore, Connector, FileRepository, IndexRunRepository, IngestMessage, ParseTaskMessage,
    ProjectRepository, Queue, SourceRepository, Stream,
};
use mcb_domain::{File, IndexRunId, ProjectId, RunStage, RunStatus, SourceId};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::use_cases::analytics::AnalyticsStage;
use crate::use_cases::embed::EmbedStage;
use crate::use_cases::graph_sync::GraphSyncStage;
use crate::use_cases::lineage::LineageStage;
use crate::use_cases::parse_stage::ParseStage;
use crate::use_cases::resolver::ResolveStage;

/// Immutable per-run context threaded through every stage (§4.1).
#[derive(Clone)]
pub struct RunContext {
    pub index_run_id: IndexRunId,
    pub project_id: ProjectId,
    pub source_id: Option<SourceId>,
    pub workspace_dir: PathBuf,
}

/// Advances `IndexRun`s through the fixed stage sequence `clone → parse
/// → resolve → lineage → graph_sync → embed → analytics` (§4.1).
///
/// The `parse` stage is special: it fans out to Q-parse-tasks and
/// suspends; the orchestrator relinquishes control until a
/// `parse_complete` resume message arrives on Q-ingest.
pub struct PipelineOrchestrator {
    runs: Arc<dyn IndexRunRepository>,
    projects: Arc<dyn ProjectRepository>,
    sources: Arc<dyn SourceRepository>,
    files: Arc<dyn FileRepository>,
    blobs: Arc<dyn BlobStore>,
    queue: Arc<dyn Queue>,
    connectors: Vec<Arc<dyn Connector>>,
    parse_stage: ParseStage,
    resolve_stage: ResolveStage,
    lineage_stage: LineageStage,
    graph_sync_stage: GraphSyncStage,
    embed_stage: EmbedStage,
    analytics_stage: AnalyticsStage,
}

impl PipelineOrchestrator {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        runs: Arc<dyn IndexRunRepository>,
        projects: Arc<dyn ProjectRepository>,
        sources: Arc<dyn SourceRepository>,
        files: Arc<dyn FileRepository>,
        blobs: Arc<dyn BlobStore>,
        queue: Arc<dyn Queue>,
        connectors: Vec<Arc<dyn Connector>>,
        parse_stage: ParseStage,
        resolve_stage: ResolveStage,
        lineage_stage: LineageStage,
        graph_sync_stage: GraphSyncStage,
        embed_stage: EmbedStage,
        analytics_stage: AnalyticsStage,
    ) -> Self {
        Self {
            runs,
            projects,
            sources,
            files,
            blobs,
            queue,
            connectors,
            parse_stage,
            resolve_stage,
            lineage_stage,
            graph_sync_stage,
            embed_stage,
            analytics_stage,
        }
    }

    /// Handle one `ingest` stream message (§4.1, §6).
    #[instrument(skip(self, cancellation), fields(index_run_id))]
    pub async fn handle_ingest_message(
        &self,
        message: IngestMessage,
        cancellation: &CancellationToken,
    ) -> Result<()> {
        match message {
            IngestMessage::IndexRun {
                index_run_id,
                project_id,
                source_id,
                resume_from: _,
            } => {
                tracing::Span::current().record("index_run_id", index_run_id.to_string());
                self.start_or_resume(index_run_id, project_id, source_id, cancellation)
                    .await
            }
            IngestMessage::ParseComplete {
                index_run_id,
                project_id,
            } => {
                tracing::Span::current().record("index_run_id", index_run_id.to_string());
                self.resume_after_parse(index_run_id, project_id, cancellation)
                    .await
            }
        }
    }

    async fn start_or_resume(
        &self,
        index_run_id: IndexRunId,
        project_id: ProjectId,
        source_id: Option<SourceId>,
        cancellation: &CancellationToken,
    ) -> Result<()> {
        let mut run = self.runs.get(index_run_id).await?;
        if run.status == RunStatus::Pending {
            run.start()?;
            self.runs.save(&run).await?;
        }

        let workspace_dir = PathBuf::from(format!("workspace/{index_run_id}"));
        let ctx = RunContext {
            index_run_id,
            project_id,
            source_id,
            workspace_dir,
        };

        if cancellation.is_cancelled() {
            return self.cancel_run(index_run_id).await;
        }

        // A redelivered `index_run` message restarts from `resume_cursor`
        // rather than re-running stages already recorded as complete —
        // otherwise a crash between clone and fan-out would re-clone and
        // re-publish a fresh set of parse_chunk messages on every retry.
        match run.resume_cursor {
            None => {
                info!(stage = "clone", %index_run_id, "starting stage");
                if let Err(err) = self.run_clone_stage(&ctx).await {
                    self.fail_run(index_run_id, &err).await;
                    return Err(err);
                }
                let mut run = self.runs.get(index_run_id).await?;
                run.advance_stage(RunStage::Clone)?;
                self.runs.save(&run).await?;
            }
            Some(RunStage::Clone) => {
                info!(%index_run_id, "resume_cursor at clone, skipping already-completed clone stage");
            }
            Some(stage) => {
                info!(%index_run_id, ?stage, "index_run message redelivered past parse fan-out, nothing left to do here");
                return Ok(());
            }
        }

        if cancellation.is_cancelled() {
            return self.cancel_run(index_run_id).await;
        }

        info!(stage = "parse", %index_run_id, "fanning out parse tasks");
        match self.parse_stage.fan_out(&ctx, &*self.runs, &*self.queue).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.fail_run(index_run_id, &err).await;
                Err(err)
            }
        }
    }

    async fn resume_after_parse(
        &self,
        index_run_id: IndexRunId,
        project_id: ProjectId,
        cancellation: &CancellationToken,
    ) -> Result<()> {
        let mut run = self.runs.get(index_run_id).await?;
        if run.chunks_remaining != 0 {
            return Err(Error::InvariantViolation {
                message: format!(
                    "parse_complete received for run {index_run_id} with chunks_remaining = {}",
                    run.chunks_remaining
                ),
            });
        }
        run.advance_stage(RunStage::Parse)?;
        self.runs.save(&run).await?;

        let ctx = RunContext {
            index_run_id,
            project_id,
            source_id: run.source_id,
            workspace_dir: PathBuf::from(format!("workspace/{index_run_id}")),
        };

        for stage in [
            RunStage::Resolve,
            RunStage::Lineage,
            RunStage::GraphSync,
            RunStage::Embed,
            RunStage::Analytics,
        ] {
            if cancellation.is_cancelled() {
                return self.cancel_run(index_run_id).await;
            }
            info!(?stage, %index_run_id, "running stage");
            let result = match stage {
                RunStage::Resolve => self.resolve_stage.run(&ctx).await,
                RunStage::Lineage => self.lineage_stage.run(&ctx).await,
                RunStage::GraphSync => self.graph_sync_stage.run(&ctx).await,
                RunStage::Embed => self.embed_stage.run(&ctx).await,
                RunStage::Analytics => self.analytics_stage.run(&ctx).await,
                _ => unreachable!("resume_after_parse only iterates post-parse stages"),
            };
            if let Err(err) = result {
                self.fail_run(index_run_id, &err).await;
                return Err(err);
            }
            let mut run = self.runs.get(index_run_id).await?;
            run.advance_stage(stage)?;
            self.runs.save(&run).await?;
        }

        let mut run = self.runs.get(index_run_id).await?;
        run.complete()?;
        self.runs.save(&run).await?;
        info!(%index_run_id, "run completed");
        Ok(())
    }

    async fn run_clone_stage(&self, ctx: &RunContext) -> Result<()> {
        let project = self.projects.get(ctx.project_id).await?;
        let sources = if let Some(source_id) = ctx.source_id {
            vec![self.sources.get(source_id).await?]
        } else {
            self.sources.list_for_project(ctx.project_id).await?
        };

        for source in &sources {
            let connector = self
                .connectors
                .iter()
                .find(|c| c.source_type() == source.source_type)
                .ok_or_else(|| Error::Connector {
                    message: format!("no connector registered for {:?}", source.source_type),
                    source: None,
                })?;
            let outcome = connector.fetch(source).await?;
            let mut source = source.clone();
            if let Some(sha) = &outcome.commit_sha {
                source.mark_synced(sha.clone());
            }
            self.sources.upsert(&source).await?;

            for key in self.blobs.list(&outcome.workspace_prefix).await? {
                let content = self.blobs.get(&key).await?;
                let file = File::new(project.id, source.id, key, &content);
                self.files.upsert(&file).await?;
            }
        }
        Ok(())
    }

    async fn fail_run(&self, index_run_id: IndexRunId, err: &Error) {
        warn!(%index_run_id, error = %err, "run failed");
        if let Ok(mut run) = self.runs.get(index_run_id).await {
            run.fail(err.to_string());
            let _ = self.runs.save(&run).await;
        }
    }

    async fn cancel_run(&self, index_run_id: IndexRunId) -> Result<()> {
        let mut run = self.runs.get(index_run_id).await?;
        run.cancel()?;
        self.runs.save(&run).await
    }
}

/// Publish a `parse_chunk` message, used by [`crate::use_cases::parse_stage::ParseStage`].
pub async fn publish_parse_chunk(queue: &dyn Queue, message: &ParseTaskMessage) -> Result<()> {
    let payload = serde_json::to_vec(message)
        .map_err(|e| Error::Internal { message: e.to_string() })?;
    queue.publish(Stream::ParseTasks, &payload).await
}
