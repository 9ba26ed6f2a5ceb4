//! Runtime configuration for the record store server.
//!
//! Values come from `BUDGET_*` environment variables and fall back to the
//! local development defaults.

use anyhow::{Context, Result};
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:budget.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Origin the web frontend is served from
    pub cors_origin: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

impl BackendConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("BUDGET_DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.database_url);

        let bind_addr = match lookup("BUDGET_BIND_ADDR") {
            Some(raw) => raw
                .trim()
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid BUDGET_BIND_ADDR: {}", raw))?,
            None => defaults.bind_addr,
        };

        let cors_origin = lookup("BUDGET_CORS_ORIGIN")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.cors_origin);

        Ok(Self {
            database_url,
            bind_addr,
            cors_origin,
        })
    }
}
