//! # Infrastructure layer
//!
//! Concrete adapters for the domain ports, plus the ambient stack every
//! deployment needs regardless of which adapters are wired in:
//! configuration, logging, and the composition root.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`db`] | `sea-orm` Relational Store entities, migrations, and repositories |
//! | [`graph`] | `sea-orm`-backed Graph Store adjacency mirror |
//! | [`blob`] | Local-filesystem Blob Store |
//! | [`queue`] | `sea-streamer`-backed Queue |
//! | [`config`] | `figment` configuration, hot-reloadable via `arc-swap` |
//! | [`logging`] | `tracing-subscriber` setup for CLI and worker modes |
//! | [`composition`] | Wires every adapter into an [`composition::AppContext`] |
//! | [`error`] | Conversions from adapter error types into [`mcb_domain::Error`] |

pub mod blob;
pub mod composition;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod logging;
pub mod queue;

pub use composition::AppContext;
pub use config::AppConfig;
