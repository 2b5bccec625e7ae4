//! Pooled `sea-orm` connection setup, shared across repository adapters
//! and parse workers (§5 "Shared resources").

use mcb_domain::error::{Error, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::DatabaseConfig;

/// Open a pooled connection, sized per `config.max_connections`.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    options.max_connections(config.max_connections);
    Database::connect(options)
        .await
        .map_err(|e| Error::storage_with_source(format!("connecting to {}", config.url), true, e))
}
