//! SQLite backend for the provisioning engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
