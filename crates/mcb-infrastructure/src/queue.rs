//! Queue (Q, §2, §6): a `sea-streamer` adapter over the `ingest` and
//! `parse-tasks` logical streams, backed by the file streamer for local
//! development and the redis streamer for a shared deployment,
//! selected by the configured URI's scheme.
//!
//! `sea-streamer`'s own consumer commits a message's offset the moment
//! `next()` returns it, regardless of whether the caller ever finishes
//! processing it — there is no broker-level deferred-commit mode to lean
//! on. Visibility-timeout redelivery (§5 "Timeouts", spec.md's "message
//! is NOT acked, so the queue redelivers after the visibility timeout")
//! is therefore implemented in this adapter: every message handed out by
//! [`SeaStreamerQueue::receive`] is tracked in `pending` until
//! [`SeaStreamerQueue::ack`] removes it; a message nobody acks within
//! `visibility_timeout_secs` is handed out again on a later `receive`
//! call before any new message is pulled from the underlying stream.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{MessageHandle, Queue, Stream as LogicalStream};
use sea_streamer::{
    Buffer, Consumer, ConsumerMode, ConsumerOptions, Message, Producer, SeqPos, StreamKey,
    Streamer, StreamerUri,
};

use crate::config::QueueConfig;

struct PendingMessage {
    stream: LogicalStream,
    payload: Vec<u8>,
    received_at: Instant,
}

fn stream_key(config: &QueueConfig, stream: LogicalStream) -> Result<StreamKey> {
    let name = match stream {
        LogicalStream::Ingest => &config.ingest_stream,
        LogicalStream::ParseTasks => &config.parse_tasks_stream,
    };
    StreamKey::new(name.clone())
        .map_err(|e| Error::queue_with_source(format!("invalid stream name {name}"), e))
}

enum Backend {
    File(FileBackend),
    Redis(RedisBackend),
}

struct FileBackend {
    streamer: sea_streamer::file::FileStreamer,
    consumers: dashmap::DashMap<&'static str, sea_streamer::file::FileConsumer>,
}

struct RedisBackend {
    streamer: sea_streamer::redis::RedisStreamer,
    consumers: dashmap::DashMap<&'static str, sea_streamer::redis::RedisConsumer>,
}

/// `Queue` adapter dispatching to a `sea-streamer` file or redis backend
/// based on the configured URI's scheme.
pub struct SeaStreamerQueue {
    backend: Backend,
    config: QueueConfig,
    pending: dashmap::DashMap<String, PendingMessage>,
}

impl SeaStreamerQueue {
    /// Connect using `config.uri`, picking the file or redis backend by
    /// scheme (`file://` or `redis://`).
    pub async fn connect(config: QueueConfig) -> Result<Self> {
        let uri: StreamerUri = config
            .uri
            .parse()
            .map_err(|e: sea_streamer::StreamUrlErr| Error::queue_with_source(format!("invalid queue uri {}", config.uri), e))?;

        let backend = if config.uri.starts_with("redis://") {
            let streamer = sea_streamer::redis::RedisStreamer::connect(uri, Default::default())
                .await
                .map_err(|e| Error::queue_with_source("connecting redis streamer", e))?;
            Backend::Redis(RedisBackend {
                streamer,
                consumers: dashmap::DashMap::new(),
            })
        } else {
            let streamer = sea_streamer::file::FileStreamer::connect(uri, Default::default())
                .await
                .map_err(|e| Error::queue_with_source("connecting file streamer", e))?;
            Backend::File(FileBackend {
                streamer,
                consumers: dashmap::DashMap::new(),
            })
        };

        Ok(Self { backend, config, pending: dashmap::DashMap::new() })
    }

    fn logical_name(stream: LogicalStream) -> &'static str {
        match stream {
            LogicalStream::Ingest => "ingest",
            LogicalStream::ParseTasks => "parse-tasks",
        }
    }

    /// Re-hand-out a pending message whose visibility timeout has
    /// elapsed, if one exists for `stream`, resetting its clock.
    fn reclaim_expired(&self, stream: LogicalStream) -> Option<(MessageHandle, Vec<u8>)> {
        let timeout = Duration::from_secs(self.config.visibility_timeout_secs);
        let expired_key = self
            .pending
            .iter()
            .find(|entry| entry.value().stream == stream && entry.value().received_at.elapsed() >= timeout)
            .map(|entry| entry.key().clone())?;

        let mut entry = self.pending.get_mut(&expired_key)?;
        entry.received_at = Instant::now();
        Some((MessageHandle(expired_key), entry.payload.clone()))
    }

    fn track_pending(&self, handle: &MessageHandle, stream: LogicalStream, payload: Vec<u8>) {
        self.pending.insert(
            handle.0.clone(),
            PendingMessage { stream, payload, received_at: Instant::now() },
        );
    }
}

#[async_trait]
impl Queue for SeaStreamerQueue {
    async fn publish(&self, stream: LogicalStream, payload: &[u8]) -> Result<()> {
        let key = stream_key(&self.config, stream)?;
        match &self.backend {
            Backend::File(b) => {
                let producer = b
                    .streamer
                    .create_generic_producer(Default::default())
                    .await
                    .map_err(|e| Error::queue_with_source("create file producer", e))?;
                producer
                    .send_to(&key, payload)
                    .map_err(|e| Error::queue_with_source("publish to file stream", e))?
                    .await
                    .map_err(|e| Error::queue_with_source("await file publish ack", e))?;
            }
            Backend::Redis(b) => {
                let producer = b
                    .streamer
                    .create_generic_producer(Default::default())
                    .await
                    .map_err(|e| Error::queue_with_source("create redis producer", e))?;
                producer
                    .send_to(&key, payload)
                    .map_err(|e| Error::queue_with_source("publish to redis stream", e))?
                    .await
                    .map_err(|e| Error::queue_with_source("await redis publish ack", e))?;
            }
        }
        Ok(())
    }

    async fn receive(&self, stream: LogicalStream) -> Result<Option<(MessageHandle, Vec<u8>)>> {
        if let Some(redelivery) = self.reclaim_expired(stream) {
            return Ok(Some(redelivery));
        }

        let key = stream_key(&self.config, stream)?;
        let name = Self::logical_name(stream);

        let (handle, payload) = match &self.backend {
            Backend::File(b) => {
                if !b.consumers.contains_key(name) {
                    let mut options = sea_streamer::file::FileConsumerOptions::new(ConsumerMode::RealTime);
                    options.set_auto_stream_reset(sea_streamer::file::AutoStreamReset::Earliest);
                    let consumer = b
                        .streamer
                        .create_consumer(&[key], options)
                        .await
                        .map_err(|e| Error::queue_with_source("create file consumer", e))?;
                    b.consumers.insert(name, consumer);
                }
                let consumer = b.consumers.get(name).expect("consumer inserted above");
                let message = consumer
                    .next()
                    .await
                    .map_err(|e| Error::queue_with_source("receive from file stream", e))?;
                (seq_handle(name, SeqPos::At(message.sequence())), message.message().as_bytes().to_vec())
            }
            Backend::Redis(b) => {
                if !b.consumers.contains_key(name) {
                    let mut options = sea_streamer::redis::RedisConsumerOptions::new(ConsumerMode::LoadBalanced);
                    options.set_auto_stream_reset(sea_streamer::redis::AutoStreamReset::Earliest);
                    let consumer = b
                        .streamer
                        .create_consumer(&[key], options)
                        .await
                        .map_err(|e| Error::queue_with_source("create redis consumer", e))?;
                    b.consumers.insert(name, consumer);
                }
                let consumer = b.consumers.get(name).expect("consumer inserted above");
                let message = consumer
                    .next()
                    .await
                    .map_err(|e| Error::queue_with_source("receive from redis stream", e))?;
                (seq_handle(name, SeqPos::At(message.sequence())), message.message().as_bytes().to_vec())
            }
        };

        self.track_pending(&handle, stream, payload.clone());
        Ok(Some((handle, payload)))
    }

    async fn ack(&self, _stream: LogicalStream, handle: MessageHandle) -> Result<()> {
        // `sea-streamer` advances its own stream position the moment
        // `next()` returns a message, so the at-least-once redelivery
        // contract is enforced here, not by the broker: a message stays
        // in `pending` (and is handed out again past the visibility
        // timeout) until this removes it.
        self.pending.remove(&handle.0);
        Ok(())
    }
}

fn seq_handle(stream_name: &str, seq: SeqPos) -> MessageHandle {
    MessageHandle(format!("{stream_name}:{seq:?}"))
}
