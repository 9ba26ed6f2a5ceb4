//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services: routing,
//! JSON (de)serialization and mapping of domain errors to status codes.
//!
//! ## Supported Operations
//!
//! - **GET /api/health**: liveness probe
//! - **GET /api/users/:user_id/{income,expense}/latest**: latest record, `record: null` when none
//! - **PUT /api/users/:user_id/{income,expense}**: upsert the user's record

pub mod rest;

pub use rest::*;
