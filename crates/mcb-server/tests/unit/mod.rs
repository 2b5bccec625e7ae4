//! Integration tests — `cargo test -p mcb-server --test unit`
//!
//! `run_worker` blocks on an OS shutdown signal, so its consumer loops
//! are exercised at the use-case layer instead (`mcb-application`'s
//! `orchestrator_tests`/`parse_worker_tests` drain the same
//! `PipelineOrchestrator`/`ParseWorker` this crate wraps). What's left
//! to verify here is the tunables this crate owns.

mod worker_config_tests;
