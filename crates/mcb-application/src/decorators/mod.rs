//! Decorators wrapping provider ports to add cross-cutting concerns
//! (timing, logging) without modifying provider implementations.

mod instrumented_embedder;

pub use instrumented_embedder::InstrumentedEmbedder;
