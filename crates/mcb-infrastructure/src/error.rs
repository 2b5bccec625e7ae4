//! Adapter error mapping: turns `sea-orm`, `reqwest`, and `git2`
//! errors into [`mcb_domain::Error`] without leaking those types past
//! this crate's boundary.

use mcb_domain::Error;

/// Classify a `sea-orm` error as transient (the queue should redeliver)
/// or permanent (a constraint violation, stage should fail).
fn is_transient_db_error(err: &sea_orm::DbErr) -> bool {
    matches!(
        err,
        sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Exec(_)
    )
}

/// Map a `sea-orm` database error raised while serving `context`.
pub fn db_err(context: &str, err: sea_orm::DbErr) -> Error {
    let transient = is_transient_db_error(&err);
    Error::storage_with_source(format!("{context}: {err}"), transient, err)
}

/// Map a `sea-orm` error from the Graph Store adapter, which shares the
/// Relational Store's connection but a distinct error variant.
pub fn graph_err(context: &str, err: sea_orm::DbErr) -> Error {
    Error::graph_store_with_source(format!("{context}: {err}"), err)
}

/// Map a `git2` error from the git connector.
pub fn git_err(context: &str, err: git2::Error) -> Error {
    Error::connector_with_source(format!("{context}: {err}"), err)
}

/// Map a `reqwest` error from the embedder HTTP client.
pub fn reqwest_err(context: &str, err: reqwest::Error) -> Error {
    Error::embedding_with_source(format!("{context}: {err}"), err)
}

/// Map an `std::io::Error` from the Blob Store's filesystem adapter.
pub fn io_err(context: &str, err: std::io::Error) -> Error {
    Error::blob_store_with_source(format!("{context}: {err}"), err)
}
