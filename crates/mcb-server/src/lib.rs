//! # Server layer
//!
//! Long-lived runtime that drives the use cases in `mcb-application`
//! against the adapters wired up by `mcb-infrastructure::AppContext`:
//! the ingest consumer loop (the orchestrator) and a bounded
//! parse-task worker pool, both cancellable via a shared
//! `tokio_util::sync::CancellationToken` (§5, §10.6).
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`runtime`] | The consumer loops, the worker pool, and graceful shutdown |

pub mod runtime;

pub use runtime::{run_worker, WorkerConfig};
