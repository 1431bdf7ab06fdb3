//! # SQLite Database methods
//!
//! Low-level SQLite interactions, one module per table.
//!
//! These are plain functions that accept a `&mut SqliteConnection`. Callers pass a pooled connection, or `&mut *tx`
//! when several calls must share a transaction. Timestamps are always bound by the caller rather than left to column
//! defaults, so that every row is written in the same RFC 3339 format.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod orders;
pub mod plans;
pub mod user_servers;

const SQLITE_DB_URL: &str = "sqlite://data/hosting_store.db";

pub fn db_url() -> String {
    let result = env::var("HOSTING_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ HOSTING_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
