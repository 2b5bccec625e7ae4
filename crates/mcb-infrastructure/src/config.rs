//! Runtime configuration (§10.3): a TOML file layered with `MCB_`
//! environment-variable overrides via `figment`, validated eagerly at
//! startup and held behind an `arc_swap::ArcSwap` for hot reload.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use mcb_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Database connection settings for the Relational Store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sea-orm` connection URL, e.g. `postgres://...` or `sqlite://...`.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Queue backend settings (§2 "Q").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// `sea-streamer` stream URI, e.g. `file://./workspace/queue`.
    pub uri: String,
    #[serde(default = "default_ingest_stream")]
    pub ingest_stream: String,
    #[serde(default = "default_parse_tasks_stream")]
    pub parse_tasks_stream: String,
    /// Seconds an unacked message stays invisible to other receivers
    /// before it is redelivered (§5 "Timeouts").
    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: u64,
}

fn default_ingest_stream() -> String {
    "ingest".to_owned()
}

fn default_parse_tasks_stream() -> String {
    "parse-tasks".to_owned()
}

fn default_visibility_timeout_secs() -> u64 {
    300
}

/// Embed-provider selection and credentials (§4.8, §6 "Embedder").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Base URL of an OpenAI/OpenRouter-compatible embeddings endpoint.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_embed_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_embed_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embed_batch_size() -> usize {
    96
}

fn default_embed_timeout_secs() -> u64 {
    30
}

/// Parse-stage chunking bounds (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    #[serde(default = "default_chunk_size_min")]
    pub min_files: usize,
    #[serde(default = "default_chunk_size_max")]
    pub max_files: usize,
}

fn default_chunk_size_min() -> usize {
    10
}

fn default_chunk_size_max() -> usize {
    500
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            min_files: default_chunk_size_min(),
            max_files: default_chunk_size_max(),
        }
    }
}

/// Top-level application configuration, loaded once at startup and
/// reloadable via [`ConfigHandle::reload`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub workspace_root: String,
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub embed: EmbedConfig,
    #[serde(default)]
    pub chunk: ChunkConfig,
}

impl AppConfig {
    /// Load from `config/{env}.toml` layered with `MCB_`-prefixed
    /// environment overrides, then validate.
    pub fn load(env: &str) -> Result<Self> {
        let path = format!("config/{env}.toml");
        Self::load_from(Path::new(&path))
    }

    /// Load from an explicit TOML file path, used by tests and the
    /// `migrate`/`enqueue`/`worker` CLI subcommands alike (§10.6).
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Self = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MCB_").split("__"))
            .extract()
            .map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Eager startup validation (§10.3): chunk bounds sane, embed batch
    /// size in `[1, 100]`.
    fn validate(&self) -> Result<()> {
        if self.chunk.min_files == 0 || self.chunk.min_files > self.chunk.max_files {
            return Err(Error::config(format!(
                "invalid chunk bounds: min_files={} max_files={}",
                self.chunk.min_files, self.chunk.max_files
            )));
        }
        if !(1..=100).contains(&self.embed.batch_size) {
            return Err(Error::config(format!(
                "embed.batch_size must be in [1, 100], got {}",
                self.embed.batch_size
            )));
        }
        Ok(())
    }
}

/// Hot-reloadable handle around an [`AppConfig`] (§10.3): a file-watch
/// or `SIGHUP` handler calls [`ConfigHandle::reload`] to rotate embed
/// provider credentials without a process restart.
#[derive(Clone)]
pub struct ConfigHandle {
    current: Arc<ArcSwap<AppConfig>>,
    source_path: Arc<Path>,
}

impl ConfigHandle {
    /// Load `path` and wrap it for hot reload.
    pub fn load(path: &Path) -> Result<Self> {
        let config = AppConfig::load_from(path)?;
        Ok(Self {
            current: Arc::new(ArcSwap::from_pointee(config)),
            source_path: Arc::from(path),
        })
    }

    /// The current configuration snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<AppConfig> {
        self.current.load_full()
    }

    /// Re-read and re-validate the source file, swapping it in only on
    /// success so a malformed reload never tears down a running config.
    pub fn reload(&self) -> Result<()> {
        let config = AppConfig::load_from(&self.source_path)?;
        self.current.store(Arc::new(config));
        Ok(())
    }

    /// Watch the source file with `notify` and call [`Self::reload`] on
    /// every write, so embed provider credentials can rotate without a
    /// restart. The returned watcher must be kept alive; dropping it
    /// stops delivery.
    pub fn watch(&self) -> Result<notify::RecommendedWatcher> {
        let handle = self.clone();
        let runtime = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else {
                tracing::warn!(error = ?res, "config file watch error");
                return;
            };
            if !should_reload(&event) {
                return;
            }
            let handle = handle.clone();
            runtime.spawn(async move {
                // Let a writer finish its replace-in-place before re-reading.
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                match handle.reload() {
                    Ok(()) => tracing::info!(path = ?handle.source_path, "configuration reloaded"),
                    Err(err) => tracing::warn!(path = ?handle.source_path, error = %err, "configuration reload failed, keeping previous config"),
                }
            });
        })
        .map_err(|e| Error::config(format!("creating config file watcher: {e}")))?;

        notify::Watcher::watch(&mut watcher, &self.source_path, notify::RecursiveMode::NonRecursive)
            .map_err(|e| Error::config(format!("watching {}: {e}", self.source_path.display())))?;

        Ok(watcher)
    }
}

fn should_reload(event: &notify::Event) -> bool {
    matches!(
        event.kind,
        notify::EventKind::Modify(notify::event::ModifyKind::Data(_))
            | notify::EventKind::Modify(notify::event::ModifyKind::Any)
            | notify::EventKind::Create(_)
    )
}
