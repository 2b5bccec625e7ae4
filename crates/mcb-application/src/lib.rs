//! # Application layer
//!
//! Use cases and orchestration for the code-knowledge-graph ingestion
//! pipeline, following Clean Architecture: this crate depends only on
//! `mcb-domain` and `mcb-utils` plus pure-Rust async/serialization
//! libraries, never on infrastructure or a specific provider.
//!
//! ## Use cases
//!
//! - [`use_cases::PipelineOrchestrator`]: advances an `IndexRun`
//!   through its fixed stage sequence.
//! - [`use_cases::ParseStage`] / [`use_cases::ParseWorker`]: fan out
//!   and process parse chunks.
//! - [`use_cases::ResolveStage`], [`use_cases::LineageStage`],
//!   [`use_cases::GraphSyncStage`], [`use_cases::EmbedStage`],
//!   [`use_cases::AnalyticsStage`]: the post-parse stage pipeline.
//!
//! ## Registry
//!
//! [`registry::PARSER_REGISTRATIONS`] is the `linkme` distributed slice
//! parser implementations in `mcb-providers` register themselves into.
//! This crate declares the slice but does not depend on `mcb-providers`
//! to avoid a circular dependency; `mcb-infrastructure` wires the two
//! together at startup.
//!
//! ## Decorators
//!
//! SOLID Open/Closed-compliant decorators for cross-cutting concerns:
//! - [`decorators::InstrumentedEmbedder`]: adds timing spans around an
//!   `Embedder`.

pub mod decorators;
pub mod registry;
pub mod use_cases;

pub use decorators::InstrumentedEmbedder;
pub use registry::ParserRegistry;
pub use use_cases::*;
