//! # Domain Module
//!
//! Business rules for the budget records, independent of HTTP and of the
//! storage engine.
//!
//! - **record_service**: load the latest record of a user, save (upsert) it

pub mod record_service;

pub use record_service::*;
