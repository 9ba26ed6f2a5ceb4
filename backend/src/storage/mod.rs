//! # Storage Module
//!
//! Persistence for the income and expense records.
//!
//! The domain layer only sees the [`RecordStorage`] trait; the SQLite
//! implementation keeps one row per user and entity, addressed by a unique
//! `user_id` column and replaced in place on every upsert.

pub mod sqlite;
pub mod traits;

pub use sqlite::{DbConnection, SqliteRecordRepository};
pub use traits::{RecordStorage, StorageError};
