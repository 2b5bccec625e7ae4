//! Schema migrations for the abridged schema (§6), one consolidated
//! `execute_unprepared` statement per table in the style the relational
//! store already used for its own migrations.

mod m20240101_000001_initial_schema;

use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use mcb_domain::error::Result;

use crate::error::db_err;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_initial_schema::Migration)]
    }
}

/// Apply every pending migration, wrapping `sea-orm-migration`'s error
/// type so callers outside this crate never need it as a dependency.
pub async fn run(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| db_err("running relational store migrations", e))
}
