//! `clap`-derived CLI surface (§10.6): `migrate`, `enqueue`, and
//! `worker`, the operationally necessary commands for running the
//! pipeline outside of tests.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mcb_application::registry::ParserRegistry;
use mcb_domain::entities::IndexRun;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{
    Connector, Embedder, IndexRunRepository, IngestMessage, ProjectRepository, Queue,
    SourceRepository, Stream,
};
use mcb_domain::value_objects::{ProjectId, SourceId};
use mcb_infrastructure::config::{AppConfig, ConfigHandle};
use mcb_infrastructure::logging::{self, LogMode};
use mcb_infrastructure::AppContext;
use mcb_providers::connectors::{FilesystemConnector, GitConnector, UploadConnector};
use mcb_providers::{EmbedderConfig, HttpEmbedder};
use mcb_server::{run_worker, WorkerConfig};

#[derive(Parser)]
#[command(name = "mcb")]
#[command(about = "Code-knowledge-graph ingestion pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to the config TOML file.
    #[arg(long, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run pending Relational Store migrations.
    Migrate,
    /// Create an `IndexRun` for `project` (and optionally `source`) and
    /// publish it to the `ingest` stream.
    Enqueue {
        /// Project slug.
        #[arg(long)]
        project: String,
        /// Source id (UUID). Omit to index every source for the project.
        #[arg(long)]
        source: Option<String>,
    },
    /// Run the long-lived consumer loop: the ingest orchestrator plus
    /// the parse-task worker pool.
    Worker {
        /// Number of concurrent parse-task consumer tasks.
        #[arg(long)]
        parse_concurrency: Option<usize>,
    },
}

/// Dispatch a parsed [`Cli`] invocation. The thin `main.rs` entrypoint
/// delegates here so integration tests can exercise the same path.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Migrate => {
            let _guard = logging::init(LogMode::Cli, None);
            run_migrate(&cli.config).await
        }
        Command::Enqueue { project, source } => {
            let _guard = logging::init(LogMode::Cli, None);
            run_enqueue(&cli.config, &project, source).await
        }
        Command::Worker { parse_concurrency } => {
            let _guard = logging::init(LogMode::Worker, Some(std::path::Path::new("logs")));
            run_worker_command(&cli.config, parse_concurrency).await
        }
    }
}

async fn load_config(path: &PathBuf) -> Result<AppConfig> {
    AppConfig::load_from(path)
}

async fn run_migrate(config_path: &PathBuf) -> Result<()> {
    let config = load_config(config_path).await?;
    let db = mcb_infrastructure::db::pool::connect(&config.database).await?;
    mcb_infrastructure::db::migration::run(&db).await?;
    tracing::info!("migrations applied");
    Ok(())
}

async fn run_enqueue(config_path: &PathBuf, project_slug: &str, source: Option<String>) -> Result<()> {
    let config = load_config(config_path).await?;
    let context = build_context(config).await?;

    let project = context.repos.projects.get_by_slug(project_slug).await?;
    let source_id = source.map(|s| SourceId::from_str(&s)).transpose().map_err(|e| {
        Error::config(format!("invalid --source id: {e}"))
    })?;

    if let Some(id) = source_id {
        enqueue_one(&context, project.id, Some(id)).await?;
    } else {
        let sources = context.repos.sources.list_for_project(project.id).await?;
        if sources.is_empty() {
            enqueue_one(&context, project.id, None).await?;
        } else {
            for source in sources {
                enqueue_one(&context, project.id, Some(source.id)).await?;
            }
        }
    }
    Ok(())
}

async fn enqueue_one(context: &AppContext, project_id: ProjectId, source_id: Option<SourceId>) -> Result<()> {
    let run = IndexRun::new(project_id, source_id);
    context.repos.index_runs.insert(&run).await?;

    let message = IngestMessage::IndexRun {
        index_run_id: run.id,
        project_id,
        source_id,
        resume_from: None,
    };
    let payload = serde_json::to_vec(&message)
        .map_err(|e| Error::queue_with_source("serializing ingest message", e))?;
    context.queue.publish(Stream::Ingest, &payload).await?;

    tracing::info!(index_run_id = %run.id, %project_id, "enqueued index run");
    Ok(())
}

async fn run_worker_command(config_path: &PathBuf, parse_concurrency: Option<usize>) -> Result<()> {
    let config_handle = ConfigHandle::load(config_path)?;
    // Held for the worker's lifetime: dropping it stops delivery of
    // reload events (§10.3 "SIGHUP/file-watch reload").
    let _watcher = config_handle.watch()?;

    let context = build_context((*config_handle.current()).clone()).await?;

    let mut worker_config = WorkerConfig::default();
    if let Some(n) = parse_concurrency {
        worker_config.parse_concurrency = n;
    }

    run_worker(context.orchestrator.clone(), context.parse_worker.clone(), context.queue.clone(), worker_config).await
}

/// Thread `mcb-providers`' connectors, embedder, and parser registry
/// into [`AppContext::build`] (§10.5): `mcb-infrastructure` cannot name
/// these types itself without creating a dependency cycle through
/// `mcb-server`, so the binary crate is where they finally meet.
async fn build_context(config: AppConfig) -> Result<AppContext> {
    let blobs: Arc<dyn mcb_domain::ports::BlobStore> =
        Arc::new(mcb_infrastructure::blob::FsBlobStore::new(config.workspace_root.clone()));

    let connectors: Vec<Arc<dyn Connector>> = vec![
        Arc::new(FilesystemConnector::new(blobs.clone())),
        Arc::new(GitConnector::new(blobs.clone(), PathBuf::from(&config.workspace_root).join("scratch"))),
        Arc::new(UploadConnector::new(blobs.clone())),
    ];

    let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(EmbedderConfig {
        base_url: config.embed.base_url.clone(),
        api_key: config.embed.api_key.clone(),
        model: config.embed.model.clone(),
        batch_size: config.embed.batch_size,
        timeout_secs: config.embed.timeout_secs,
    })?);

    let parser_registry = Arc::new(ParserRegistry::from_registrations());

    AppContext::build(config, connectors, embedder, parser_registry).await
}
