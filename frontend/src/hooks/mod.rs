//! # Hooks
//!
//! Stateful building blocks for the view layer:
//!
//! - **use_entity_data**: income/expense record state, autosave, manual save
//! - **use_identity_load**: reload on identity change
//! - **debounce**: the quiet-period timer behind autosave

pub mod debounce;
pub mod use_entity_data;
pub mod use_identity_load;

pub use debounce::DebounceScheduler;
pub use use_entity_data::{EntityDataHook, EntitySnapshot, SaveOutcome, SyncStatus};
pub use use_identity_load::{IdentityAware, LoadTrigger};
