//! Schema crate for the surf spot database.
//!
//! Owns the SQL migrations, the row models, a typed [`Database`] handle and
//! the [`delegate`] module that exposes every table through one small
//! trait so bulk cleanup can be written once.

pub mod database;
pub mod delegate;
pub mod errors;
pub mod models;

pub use database::Database;
pub use delegate::{
    Delegate, Filter, FindQuery, KeyField, KeyRow, KeyValue, OrderBy, SortOrder, Table, TableSource,
};
pub use errors::DbError;

/// Embedded migrations from `crates/shakadb/migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
