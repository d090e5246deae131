use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::models::{Profile, Session};

/// Events the Auth Service emits on its change-notification stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// A live subscription to the auth change stream. Call `unsubscribe` (or
/// drop the handle) to detach; the sender side then sees the channel as
/// closed and stops delivering.
pub struct AuthSubscription {
    receiver: mpsc::UnboundedReceiver<(AuthChangeEvent, Option<Session>)>,
}

impl AuthSubscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<(AuthChangeEvent, Option<Session>)>) -> Self {
        AuthSubscription { receiver }
    }

    /// The next event, or None once the stream is closed or unsubscribed.
    pub async fn next_event(&mut self) -> Option<(AuthChangeEvent, Option<Session>)> {
        self.receiver.recv().await
    }

    /// Detach from the stream. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        self.receiver.close();
    }
}

/// The external identity provider, reduced to the calls the controller
/// needs. Failures are plain strings; callers treat every failure as the
/// absence of a session.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// The current session, refreshed first if the cached one expired.
    async fn get_session(&self) -> Result<Option<Session>, String>;

    /// Invalidate the current session with the provider.
    async fn sign_out(&self) -> Result<(), String>;

    /// Subscribe to auth change notifications (login, logout, refresh).
    fn on_auth_state_change(&self) -> AuthSubscription;
}

/// Profile lookup, queried only after a session is confirmed present.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user_id(&self, id: &str) -> Result<Option<Profile>, String>;
}
