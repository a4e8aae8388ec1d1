//! Signed-in user, shared read-only with the rest of the app.
//!
//! The identity provider owns the session. It pushes [`AuthEvent`]s into the
//! context; everything else only reads the current user or subscribes to
//! changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Sign out failed: {0}")]
    SignOutFailed(String),
}

/// External identity provider.
pub trait AuthProvider {
    /// Ask the provider to end the session. The resulting
    /// [`AuthEvent::SignedOut`] arrives through the provider's event feed.
    fn sign_out(&mut self) -> Result<(), AuthError>;
}

/// Handle returned by [`AuthContext::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Option<&AuthUser>)>;

#[derive(Default)]
pub struct AuthContext {
    user: Option<AuthUser>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("user", &self.user)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Call `listener` with the new user every time it changes.
    pub fn subscribe(&mut self, listener: impl FnMut(Option<&AuthUser>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Feed an event from the provider. Returns `true` if the user changed.
    pub fn apply(&mut self, event: AuthEvent) -> bool {
        let user = match event {
            AuthEvent::SignedIn(user) => Some(user),
            AuthEvent::SignedOut => None,
        };
        if user == self.user {
            return false;
        }

        tracing::debug!(
            user = user.as_ref().map(|u| u.id.as_str()),
            "auth state changed"
        );
        self.user = user;
        for (_, listener) in &mut self.listeners {
            listener(self.user.as_ref());
        }
        true
    }

    pub fn request_sign_out(&self, provider: &mut dyn AuthProvider) -> Result<(), AuthError> {
        if self.user.is_none() {
            return Ok(());
        }
        provider.sign_out()
    }
}
