//! Consumer loops (§5): one task draining `ingest` through the
//! [`PipelineOrchestrator`], a bounded pool of tasks draining
//! `parse-tasks` through the [`ParseWorker`], both stopping on
//! cancellation and under a graceful-shutdown grace period.

use std::sync::Arc;
use std::time::Duration;

use mcb_application::use_cases::{ParseWorker, PipelineOrchestrator};
use mcb_domain::error::Result;
use mcb_domain::ports::{IngestMessage, ParseTaskMessage, Queue, Stream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Tunables for a single worker process (§5 "Backpressure").
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of concurrent `parse-tasks` consumer tasks.
    pub parse_concurrency: usize,
    /// How long `run_worker` waits for in-flight work after
    /// cancellation before returning.
    pub shutdown_grace: Duration,
    /// Backoff applied when a queue poll returns no message, so an
    /// empty queue doesn't spin the consumer loop.
    pub idle_poll_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            parse_concurrency: 4,
            shutdown_grace: Duration::from_secs(30),
            idle_poll_backoff: Duration::from_millis(250),
        }
    }
}

/// Runs the ingest consumer and the parse-task worker pool until
/// `SIGTERM`/`SIGINT`, then waits up to `config.shutdown_grace` for
/// in-flight work to finish before returning.
pub async fn run_worker(
    orchestrator: Arc<PipelineOrchestrator>,
    parse_worker: Arc<ParseWorker>,
    queue: Arc<dyn Queue>,
    config: WorkerConfig,
) -> Result<()> {
    let cancellation = CancellationToken::new();

    let mut tasks: Vec<JoinHandle<()>> = Vec::new();
    tasks.push(spawn_ingest_loop(orchestrator, queue.clone(), cancellation.clone(), config.idle_poll_backoff));
    for worker_id in 0..config.parse_concurrency {
        tasks.push(spawn_parse_loop(
            worker_id,
            parse_worker.clone(),
            queue.clone(),
            cancellation.clone(),
            config.idle_poll_backoff,
        ));
    }

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, cancelling consumer loops");
    cancellation.cancel();

    let grace = tokio::time::timeout(config.shutdown_grace, futures::future::join_all(tasks)).await;
    if grace.is_err() {
        warn!(grace_secs = config.shutdown_grace.as_secs(), "shutdown grace period elapsed with tasks still running");
    }
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("installing SIGTERM handler");
        sigterm.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

fn spawn_ingest_loop(
    orchestrator: Arc<PipelineOrchestrator>,
    queue: Arc<dyn Queue>,
    cancellation: CancellationToken,
    idle_poll_backoff: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if cancellation.is_cancelled() {
                return;
            }
            match queue.receive(Stream::Ingest).await {
                Ok(Some((handle, payload))) => {
                    let should_ack = match serde_json::from_slice::<IngestMessage>(&payload) {
                        Ok(message) => match orchestrator.handle_ingest_message(message, &cancellation).await {
                            Ok(()) => true,
                            Err(err) => {
                                error!(error = %err, "ingest message handling failed, leaving unacked for redelivery");
                                false
                            }
                        },
                        // Never parses no matter how many times it's redelivered.
                        Err(err) => {
                            error!(error = %err, "dropping malformed ingest message");
                            true
                        }
                    };
                    if should_ack {
                        if let Err(err) = queue.ack(Stream::Ingest, handle).await {
                            error!(error = %err, "failed to ack ingest message");
                        }
                    }
                }
                Ok(None) => tokio::time::sleep(idle_poll_backoff).await,
                Err(err) => {
                    error!(error = %err, "ingest queue receive failed");
                    tokio::time::sleep(idle_poll_backoff).await;
                }
            }
        }
    })
}

fn spawn_parse_loop(
    worker_id: usize,
    parse_worker: Arc<ParseWorker>,
    queue: Arc<dyn Queue>,
    cancellation: CancellationToken,
    idle_poll_backoff: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if cancellation.is_cancelled() {
                return;
            }
            match queue.receive(Stream::ParseTasks).await {
                Ok(Some((handle, payload))) => {
                    let should_ack = match serde_json::from_slice::<ParseTaskMessage>(&payload) {
                        Ok(ParseTaskMessage::ParseChunk { index_run_id, project_id, file_ids, .. }) => {
                            match parse_worker.process_chunk(index_run_id, project_id, &file_ids).await {
                                Ok(()) => true,
                                Err(err) => {
                                    error!(worker_id, error = %err, "parse chunk processing failed, leaving unacked for redelivery");
                                    false
                                }
                            }
                        }
                        // Never parses no matter how many times it's redelivered.
                        Err(err) => {
                            error!(worker_id, error = %err, "dropping malformed parse task message");
                            true
                        }
                    };
                    if should_ack {
                        if let Err(err) = queue.ack(Stream::ParseTasks, handle).await {
                            error!(worker_id, error = %err, "failed to ack parse task message");
                        }
                    }
                }
                Ok(None) => tokio::time::sleep(idle_poll_backoff).await,
                Err(err) => {
                    error!(worker_id, error = %err, "parse-tasks queue receive failed");
                    tokio::time::sleep(idle_poll_backoff).await;
                }
            }
        }
    })
}
