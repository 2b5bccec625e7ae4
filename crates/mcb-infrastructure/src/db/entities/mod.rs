//! `sea-orm` entity definitions for the abridged schema (§6).
//!
//! Every table uses a `String` primary key (UUIDs stored as their
//! canonical text form) and `chrono::DateTime<Utc>` timestamp columns,
//! matching the storage conventions the relational store already used
//! for its own project/source tables. None of these entities declare
//! `Relation` variants: repositories here only need scoped lookups by
//! foreign key, never sea-orm's join-based eager loading.

pub mod column_reference;
pub mod file;
pub mod index_run;
pub mod parse_error;
pub mod project;
pub mod project_analytics;
pub mod raw_reference;
pub mod source;
pub mod symbol;
pub mod symbol_edge;
