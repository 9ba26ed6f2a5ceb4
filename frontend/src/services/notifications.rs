//! User-facing toast notifications.
//!
//! Hooks raise notifications through the [`Notifier`] trait and never block on
//! them. [`NotificationCenter`] keeps the most recent ones for the view.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// Fire-and-forget notification sink
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, severity: Severity);
}

/// Bounded queue of recent notifications; the oldest is dropped when full
#[derive(Debug)]
pub struct NotificationCenter {
    capacity: usize,
    queue: Mutex<VecDeque<Notification>>,
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Oldest first
    pub fn recent(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    /// Hand every pending notification to the view and forget them
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().drain(..).collect()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.lock().iter().filter(|n| n.severity == severity).count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Success => info!("[notification] {}: {}", title, message),
            Severity::Error => error!("[notification] {}: {}", title, message),
        }

        let mut queue = self.lock();
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(Notification {
            title: title.to_string(),
            message: message.to_string(),
            severity,
        });
    }
}
