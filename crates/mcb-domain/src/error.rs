//! Error handling types.
//!
//! One enum shared across the domain and application layers; the
//! infrastructure and providers layers wrap their concrete adapter
//! errors (`sqlx`, `sea-orm`, `reqwest`, `git2`, ...) into the variants
//! below via the `*_with_source` constructors, keeping those crates out
//! of the domain's dependency graph.

use thiserror::Error;

/// Result type alias for operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the ingestion pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced entity does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// Description of the missing resource, e.g. "project abc123".
        resource: String,
    },

    /// Caller passed an invalid argument.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of what was invalid.
        message: String,
    },

    /// Configuration is missing or fails validation (§10.3).
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// A relational-store (RS) operation failed — see §7 "Storage".
    ///
    /// `transient` distinguishes connection-refused/deadlock errors
    /// (queue should redeliver) from permanent constraint violations
    /// (stage should fail).
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
        /// Whether the queue should redeliver and retry.
        transient: bool,
        /// Optional underlying adapter error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A graph-store (GS) sync operation failed.
    #[error("graph store error: {message}")]
    GraphStore {
        /// Description of the failure.
        message: String,
        /// Optional underlying adapter error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A blob-store (BS) operation failed.
    #[error("blob store error: {message}")]
    BlobStore {
        /// Description of the failure.
        message: String,
        /// Optional underlying adapter error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A queue publish/consume/ack operation failed.
    #[error("queue error: {message}")]
    Queue {
        /// Description of the failure.
        message: String,
        /// Optional underlying adapter error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A connector (git/s3/upload) fetch failed — §7 "Input".
    #[error("connector error: {message}")]
    Connector {
        /// Description of the failure.
        message: String,
        /// Optional underlying adapter error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An embed-provider call failed after exhausting retries — §7
    /// "External provider".
    #[error("embedding provider error: {message}")]
    Embedding {
        /// Description of the failure.
        message: String,
        /// Optional underlying adapter error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An IndexRun invariant was violated (e.g. `chunks_remaining`
    /// underflowed below zero) — fatal, per §9 Open Questions.
    #[error("invariant violation: {message}")]
    InvariantViolation {
        /// Description of the violated invariant.
        message: String,
    },

    /// The pipeline was asked to advance a run that is not in a valid
    /// state for the requested transition.
    #[error("invalid run state: run {index_run_id} is {actual}, expected {expected}")]
    InvalidRunState {
        /// The IndexRun id.
        index_run_id: String,
        /// The state the run is actually in.
        actual: String,
        /// The state the caller expected.
        expected: String,
    },

    /// Generic internal error with no more specific classification.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Short machine code for the `{code, message}` API-boundary error
    /// envelope (§7).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Config { .. } => "config_error",
            Self::Storage { .. } => "storage_error",
            Self::GraphStore { .. } => "graph_store_error",
            Self::BlobStore { .. } => "blob_store_error",
            Self::Queue { .. } => "queue_error",
            Self::Connector { .. } => "connector_error",
            Self::Embedding { .. } => "embedding_error",
            Self::InvariantViolation { .. } => "invariant_violation",
            Self::InvalidRunState { .. } => "invalid_run_state",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Whether the queue should redeliver this error's message rather
    /// than dead-lettering it immediately (§7 "Storage").
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage { transient: true, .. })
    }

    /// Build a transient storage error (connection refused, deadlock).
    pub fn storage_transient<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
            transient: true,
            source: None,
        }
    }

    /// Build a permanent storage error (constraint violation).
    pub fn storage_permanent<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
            transient: false,
            source: None,
        }
    }

    /// Build a storage error from an underlying adapter error, with the
    /// caller classifying transience.
    pub fn storage_with_source<S, E>(message: S, transient: bool, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            transient,
            source: Some(Box::new(source)),
        }
    }

    /// Build a graph-store error from an underlying adapter error.
    pub fn graph_store_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::GraphStore {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a blob-store error from an underlying adapter error.
    pub fn blob_store_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::BlobStore {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a queue error from an underlying adapter error.
    pub fn queue_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Queue {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a connector error from an underlying adapter error.
    pub fn connector_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connector {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build an embedding-provider error from an underlying adapter error.
    pub fn embedding_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Embedding {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a config error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Build a not-found error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

/// User-visible error envelope at the API boundary (§7): `{code, message}`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorEnvelope {
    /// Short machine code, see [`Error::code`].
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&Error> for ErrorEnvelope {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code().to_owned(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_storage_error_is_transient() {
        let err = Error::storage_transient("connection refused");
        assert!(err.is_transient());
        assert_eq!(err.code(), "storage_error");
    }

    #[test]
    fn permanent_storage_error_is_not_transient() {
        let err = Error::storage_permanent("unique constraint violated");
        assert!(!err.is_transient());
    }

    #[test]
    fn envelope_carries_code_and_message() {
        let err = Error::not_found("project abc123");
        let envelope: ErrorEnvelope = (&err).into();
        assert_eq!(envelope.code, "not_found");
        assert!(envelope.message.contains("abc123"));
    }
}
