//! Session configuration for the client side.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::services::localization::Language;

pub const DEFAULT_AUTOSAVE_MS: u64 = 2000;
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 20;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Quiet period before an edited record is written back
    pub autosave_ms: u64,
    pub language: Language,
    /// How many recent notifications are kept for the view
    pub notification_capacity: usize,
    /// Where the record store's REST API is served
    pub api_base_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_ms: DEFAULT_AUTOSAVE_MS,
            language: Language::default(),
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl SessionConfig {
    /// Read `BUDGET_AUTOSAVE_MS`, `BUDGET_LANGUAGE` and `BUDGET_API_URL` from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("BUDGET_AUTOSAVE_MS") {
            config.autosave_ms = value
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid BUDGET_AUTOSAVE_MS {:?}: {}", value, e))?;
        }

        if let Some(value) = lookup("BUDGET_LANGUAGE") {
            config.language = Language::parse(&value)
                .ok_or_else(|| anyhow::anyhow!("Unsupported BUDGET_LANGUAGE {:?}", value))?;
        }

        if let Some(value) = lookup("BUDGET_API_URL").filter(|v| !v.trim().is_empty()) {
            config.api_base_url = value.trim().trim_end_matches('/').to_string();
        }

        Ok(config)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_ms)
    }
}
