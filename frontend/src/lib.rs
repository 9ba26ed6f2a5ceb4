//! # Budget Tracker Frontend
//!
//! The client-side half of the budget tracker, minus the rendering. It owns
//! the in-memory income and expense records, keeps them in sync with the
//! record store and exposes the flags and notifications a view layer renders.
//!
//! ## Layout
//!
//! - **hooks**: entity data hooks (local state, derived totals, debounced
//!   autosave, manual save) and the identity-driven load trigger
//! - **services**: authentication session, record gateway, localization,
//!   notifications
//! - **planning**: session-only savings goals
//! - **analysis**: balance summary and expense breakdown
//! - **app**: [`app::BudgetSession`], which wires everything together

pub mod analysis;
pub mod app;
pub mod config;
pub mod hooks;
pub mod planning;
pub mod services;

pub use app::BudgetSession;
pub use config::SessionConfig;
