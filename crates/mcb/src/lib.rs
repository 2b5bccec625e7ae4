//! # `mcb` CLI
//!
//! Operational entrypoint for the code-knowledge-graph ingestion
//! pipeline (§10.6): runs Relational Store migrations, enqueues index
//! runs, and drives the long-lived worker process. Everything here is
//! thin glue — the pipeline itself lives in `mcb-application`'s use
//! cases, wired up by `mcb-infrastructure::AppContext`.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`cli`] | `clap` subcommands: `migrate`, `enqueue`, `worker` |

pub mod cli;

pub use cli::{run, Cli, Command};
