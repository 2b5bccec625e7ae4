//! # Providers layer
//!
//! Implementations of the domain's outward-facing ports: language
//! parsers, source connectors, and the embedding client. Nothing here
//! is reachable from `mcb-application`'s use cases directly — the
//! composition root (`mcb-infrastructure::composition`) and the `mcb`
//! binary wire these in behind `Arc<dyn Trait>` handles, and parsers
//! additionally register themselves into
//! `mcb_application::registry::PARSER_REGISTRATIONS` at link time via
//! `linkme`.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`parsers`] | One [`mcb_domain::ports::Parser`] per language family, registered by extension |
//! | [`connectors`] | One [`mcb_domain::ports::Connector`] per [`mcb_domain::entities::SourceType`] |
//! | [`embedder`] | `reqwest`-based OpenAI/OpenRouter-compatible [`mcb_domain::ports::Embedder`] |

pub mod connectors;
pub mod embedder;
pub mod parsers;

pub use embedder::{EmbedderConfig, HttpEmbedder};
