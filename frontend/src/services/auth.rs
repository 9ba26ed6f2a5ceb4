//! Authentication session.
//!
//! Sign-in itself is handled by the identity provider; this session only
//! carries the resulting identity and tells subscribers when it changes.

use log::info;
use shared::UserIdentity;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserIdentity>,
    /// True until the initial session check has resolved
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

#[derive(Debug)]
pub struct AuthSession {
    state: watch::Sender<AuthState>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession {
    /// A session whose initial check has not resolved yet
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { state }
    }

    /// Finish the initial session check with whatever identity was restored
    pub fn resolve(&self, user: Option<UserIdentity>) {
        match &user {
            Some(user) => info!("[auth] Session restored for {}", user.id),
            None => info!("[auth] No existing session"),
        }
        self.state.send_replace(AuthState { user, loading: false });
    }

    pub fn sign_in(&self, user: UserIdentity) {
        info!("[auth] Signed in as {}", user.id);
        self.state.send_replace(AuthState {
            user: Some(user),
            loading: false,
        });
    }

    pub fn sign_out(&self) {
        info!("[auth] Signed out");
        self.state.send_replace(AuthState {
            user: None,
            loading: false,
        });
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.state.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Change notification for identity transitions
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}
