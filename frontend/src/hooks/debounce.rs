//! Cancellable quiet-period timer.

use log::warn;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Runs a task once `delay` has passed without the timer being re-armed.
///
/// Arming replaces any pending timer. When the timer fires, the task is
/// spawned on its own, so cancelling or dropping the scheduler never aborts a
/// write that has already started.
#[derive(Debug)]
pub struct DebounceScheduler {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start (or restart) the quiet period for `task`.
    ///
    /// Returns false without scheduling anything when called outside a tokio
    /// runtime; any previously armed timer keeps running.
    pub fn arm<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!("[debounce] No tokio runtime, timer not armed");
            return false;
        };

        let delay = self.delay;
        let spawner = runtime.clone();
        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            spawner.spawn(task);
        });

        if let Some(previous) = self.lock().replace(timer) {
            previous.abort();
        }
        true
    }

    /// Drop the pending timer, if any. Returns whether one was waiting.
    pub fn cancel(&self) -> bool {
        match self.lock().take() {
            Some(timer) => {
                let was_waiting = !timer.is_finished();
                timer.abort();
                was_waiting
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.lock().as_ref().is_some_and(|timer| !timer.is_finished())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.lock().take() {
            timer.abort();
        }
    }
}
