//! Shared fakes for the controller integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use sessiontron::models::{Profile, ProfileVisibility, Session, SessionUser};
use sessiontron::service::{AuthChangeEvent, AuthService, AuthSubscription, ProfileStore};

/// An Auth Service fake returning a scripted session, counting calls and
/// fanning scripted events out to subscribers.
#[derive(Default)]
pub struct ScriptedAuthService {
    session: Mutex<Option<Session>>,
    /// Artificial latency of `get_session`, to order interleavings.
    delay: Option<Duration>,
    pub session_queries: AtomicUsize,
    pub sign_outs: AtomicUsize,
    listeners: Mutex<Vec<mpsc::UnboundedSender<(AuthChangeEvent, Option<Session>)>>>,
}

impl ScriptedAuthService {
    pub fn new(session: Option<Session>) -> Self {
        ScriptedAuthService {
            session: Mutex::new(session),
            ..ScriptedAuthService::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.lock().expect("session mutex poisoned") = session;
    }

    /// Push an auth change event to every live subscriber.
    pub fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        let mut listeners = self.listeners.lock().expect("listener mutex poisoned");
        listeners.retain(|tx| tx.send((event, session.clone())).is_ok());
    }

    /// Number of subscriptions the provider still sees as open.
    pub fn live_listeners(&self) -> usize {
        let mut listeners = self.listeners.lock().expect("listener mutex poisoned");
        listeners.retain(|tx| !tx.is_closed());
        listeners.len()
    }
}

#[async_trait]
impl AuthService for ScriptedAuthService {
    async fn get_session(&self) -> Result<Option<Session>, String> {
        self.session_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.session.lock().expect("session mutex poisoned").clone())
    }

    async fn sign_out(&self) -> Result<(), String> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.set_session(None);
        Ok(())
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .lock()
            .expect("listener mutex poisoned")
            .push(tx);
        AuthSubscription::new(rx)
    }
}

/// A profile store fake serving a fixed set of rows.
#[derive(Default)]
pub struct StaticProfileStore {
    profiles: Vec<Profile>,
}

impl StaticProfileStore {
    pub fn new(profiles: Vec<Profile>) -> Self {
        StaticProfileStore { profiles }
    }

    pub fn empty() -> Self {
        StaticProfileStore::default()
    }
}

#[async_trait]
impl ProfileStore for StaticProfileStore {
    async fn find_by_user_id(&self, id: &str) -> Result<Option<Profile>, String> {
        Ok(self.profiles.iter().find(|p| p.id == id).cloned())
    }
}

/// A profile store whose lookups always fail, for fail-closed tests.
pub struct FailingProfileStore;

#[async_trait]
impl ProfileStore for FailingProfileStore {
    async fn find_by_user_id(&self, _id: &str) -> Result<Option<Profile>, String> {
        Err("profile database unreachable".to_string())
    }
}

pub fn authenticated_session(user_id: &str) -> Session {
    Session {
        user: Some(SessionUser {
            id: user_id.to_string(),
            email: Some("test@example.com".to_string()),
            aud: Some("authenticated".to_string()),
        }),
        expires_at: None,
        access_token: Some("at".to_string()),
        refresh_token: Some("rt".to_string()),
    }
}

pub fn profile(id: &str, username: &str) -> Profile {
    Profile {
        id: id.to_string(),
        username: username.to_string(),
        bio: Some(String::new()),
        privacy: ProfileVisibility::Public,
    }
}
