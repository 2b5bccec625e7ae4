//! Shared id-parsing and error-mapping helpers for the repository
//! adapters in this module.

use std::str::FromStr;

use mcb_domain::error::{Error, Result};

use crate::error::db_err;

/// Parse a stored `String` column back into a strong-typed id,
/// surfacing a corrupt row as a permanent storage error rather than a
/// panic.
pub fn parse_id<T: FromStr>(context: &str, raw: &str) -> Result<T> {
    T::from_str(raw)
        .map_err(|_| Error::storage_permanent(format!("{context}: malformed id {raw:?}")))
}

/// Map a `sea-orm` error from `context`, classifying transience.
pub fn map_db_err(context: &'static str) -> impl Fn(sea_orm::DbErr) -> Error {
    move |e| db_err(context, e)
}

/// Turn a `None` row into a [`Error::not_found`] for `resource`.
pub fn require_found<T>(model: Option<T>, resource: &str) -> Result<T> {
    model.ok_or_else(|| Error::not_found(resource.to_owned()))
}

/// Serialize a value into a stored JSON column.
pub fn to_json<T: serde::Serialize>(context: &str, value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::storage_permanent(format!("{context}: serializing json: {e}")))
}

/// Deserialize a stored JSON column back into its typed form.
pub fn from_json<T: serde::de::DeserializeOwned>(
    context: &str,
    value: serde_json::Value,
) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::storage_permanent(format!("{context}: deserializing json: {e}")))
}
