//! Parse Stage fan-out (§4.2): partitions a run's files into chunks and
//! enqueues one `parse_chunk` message per chunk.

use std::sync::Arc;

use mcb_domain::error::Result;
use mcb_domain::ports::{FileRepository, IndexRunRepository, ParseTaskMessage, ProjectRepository};
use mcb_domain::ProjectId;
use mcb_utils::PathMatcher;
use tracing::info;

use crate::use_cases::orchestrator::{publish_parse_chunk, RunContext};

/// Target chunk size range (§4.2): "target 50-200 files each".
pub const CHUNK_SIZE_MIN: usize = 50;
pub const CHUNK_SIZE_TARGET: usize = 100;

/// File-path segments and suffixes that always suppress column-level
/// lineage, independent of any project-configured glob (§4.2).
fn classify_skip_lineage(matcher: &PathMatcher, path: &str) -> bool {
    matcher.skip_column_lineage(path)
}

/// Fans a run's discovered files out into fixed-size parse-task chunks.
pub struct ParseStage {
    files: Arc<dyn FileRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl ParseStage {
    #[must_use]
    pub fn new(files: Arc<dyn FileRepository>, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { files, projects }
    }

    /// Partition files into chunks, write `total_chunks` to the run, and
    /// enqueue one `parse_chunk` message per chunk (§4.2).
    pub async fn fan_out(
        &self,
        ctx: &RunContext,
        runs: &dyn IndexRunRepository,
        queue: &dyn mcb_domain::ports::Queue,
    ) -> Result<()> {
        let project = self.projects.get(ctx.project_id).await?;
        let matcher = PathMatcher::new(&project.settings.lineage_exclude_paths)
            .map_err(|e| mcb_domain::error::Error::Config { message: e.to_string() })?;

        let mut files = self.files.list_for_project(ctx.project_id).await?;
        for file in &mut files {
            file.skip_column_lineage = classify_skip_lineage(&matcher, &file.path);
            self.files.upsert(file).await?;
        }

        let chunks: Vec<Vec<mcb_domain::FileId>> = files
            .chunks(CHUNK_SIZE_TARGET)
            .map(|chunk| chunk.iter().map(|f| f.id).collect())
            .collect();

        let mut run = runs.get(ctx.index_run_id).await?;
        run.set_total_chunks(chunks.len() as u32);
        runs.save(&run).await?;

        info!(
            index_run_id = %ctx.index_run_id,
            total_chunks = chunks.len(),
            total_files = files.len(),
            "parse stage fanned out"
        );

        for (i, file_ids) in chunks.into_iter().enumerate() {
            let message = ParseTaskMessage::ParseChunk {
                index_run_id: ctx.index_run_id,
                project_id: project_id(ctx),
                chunk_id: format!("{}-{i}", ctx.index_run_id),
                file_ids,
            };
            publish_parse_chunk(queue, &message).await?;
        }
        Ok(())
    }
}

fn project_id(ctx: &RunContext) -> ProjectId {
    ctx.project_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_target_is_within_spec_range() {
        assert!(CHUNK_SIZE_TARGET >= CHUNK_SIZE_MIN);
        assert!(CHUNK_SIZE_TARGET <= 200);
    }
}
