//! Load trigger: reloads data whenever a user identity becomes available.

use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::services::auth::AuthSession;

/// Something that loads per-user data once an identity is known
#[async_trait]
pub trait IdentityAware: Send + Sync {
    fn name(&self) -> &'static str;

    async fn on_identity(&self);
}

/// Watches the auth session and calls every target when the identity goes
/// from absent to present, or changes to a different user.
///
/// Sign-out alone triggers nothing. Dropping the trigger stops watching.
pub struct LoadTrigger {
    task: JoinHandle<()>,
}

impl LoadTrigger {
    pub fn spawn(auth: &AuthSession, targets: Vec<Arc<dyn IdentityAware>>) -> Self {
        let mut changes = auth.subscribe();

        let task = tokio::spawn(async move {
            let mut last_user: Option<String> = None;
            loop {
                let current = changes.borrow_and_update().user.as_ref().map(|u| u.id.clone());

                match &current {
                    Some(user_id) if last_user.as_ref() != Some(user_id) => {
                        info!("[load-trigger] Identity {} available, loading {} targets", user_id, targets.len());
                        for target in &targets {
                            debug!("[load-trigger] Loading {}", target.name());
                            target.on_identity().await;
                        }
                    }
                    _ => {}
                }
                last_user = current;

                if changes.changed().await.is_err() {
                    debug!("[load-trigger] Auth session closed");
                    break;
                }
            }
        });

        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for LoadTrigger {
    fn drop(&mut self) {
        self.task.abort();
    }
}
