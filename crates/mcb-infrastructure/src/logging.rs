//! `tracing-subscriber` setup (§10.1): a human-readable layer for
//! interactive CLI invocations, a JSON layer for long-running worker
//! processes, both gated by `RUST_LOG` via `EnvFilter`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Which presentation the subscriber should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Human-readable, ANSI-colored output for an interactive terminal.
    Cli,
    /// JSON lines suitable for log aggregation in a worker process.
    Worker,
}

/// Install the global `tracing` subscriber for `mode`.
///
/// When `log_dir` is set, events are additionally written to a daily
/// rolling file via `tracing-appender`; the returned [`WorkerGuard`]
/// must be held for the appender's background flush thread to run —
/// dropping it silently stops file logging.
pub fn init(mode: LogMode, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "mcb.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).json()), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    match mode {
        LogMode::Cli => {
            let _ = registry.with(fmt::layer().with_target(false)).try_init();
        }
        LogMode::Worker => {
            let _ = registry.with(fmt::layer().json()).try_init();
        }
    }

    guard
}
