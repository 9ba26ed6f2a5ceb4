//! # Services
//!
//! Collaborators injected into the hooks at construction:
//!
//! - **auth**: current identity and change notification
//! - **gateway**: fetch-latest / upsert against the record store
//! - **http_gateway**: the same over the backend's REST API
//! - **localization**: translated strings and text direction
//! - **notifications**: toast sink

pub mod auth;
pub mod gateway;
pub mod http_gateway;
pub mod localization;
pub mod notifications;

#[cfg(test)]
pub mod test_utils;

pub use auth::{AuthSession, AuthState};
pub use gateway::{EmbeddedGateway, GatewayError, RecordGateway};
pub use http_gateway::HttpGateway;
pub use localization::{Language, Localizer, TranslationKey};
pub use notifications::{Notification, NotificationCenter, Notifier, Severity};
