//! The auth state controller.
//!
//! Owns the single authoritative authentication state, resolves it exactly
//! once at startup, and keeps it current against two external triggers:
//! auth change notifications from the Auth Service and visibility-regain
//! signals from the host environment. The view layer observes the state
//! read-only through a watch channel and renders purely as a function of
//! the received value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::janitor::Janitor;
use crate::models::{Profile, Session};
use crate::service::{AuthChangeEvent, AuthService, ProfileStore};
use crate::store::KeyValueStore;

/// The single authoritative authentication state. `Initializing` is the
/// start state only and is never re-entered; the other two variants may
/// transition to each other (login and logout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Initializing,
    Unauthenticated,
    Authenticated(Profile),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Initializing => "initializing",
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Authenticated(_) => "authenticated",
        }
    }
}

pub struct AuthController {
    auth: Arc<dyn AuthService>,
    profiles: Arc<dyn ProfileStore>,
    janitor: Janitor,
    state: watch::Sender<AuthState>,
    /// One-shot guard for the startup path. Swapped before the first await,
    /// so duplicate lifecycle triggers cannot issue a second session query.
    init_started: AtomicBool,
    /// Cleared at shutdown; late async callbacks check it and bail out.
    active: AtomicBool,
    /// Wakes the event pump at shutdown so it releases its subscription.
    shutdown_signal: Notify,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl AuthController {
    pub fn new(
        auth: Arc<dyn AuthService>,
        profiles: Arc<dyn ProfileStore>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Initializing);
        AuthController {
            auth,
            profiles,
            janitor: Janitor::new(store),
            state,
            init_started: AtomicBool::new(false),
            active: AtomicBool::new(true),
            shutdown_signal: Notify::new(),
            pump: Mutex::new(None),
        }
    }

    pub fn current_state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// A receiver observing every state transition, for the view layer.
    pub fn subscribe_state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Resolve the authentication state exactly once at startup: run the
    /// janitor sweep, query the current session and map it to a state.
    /// Repeat invocations return immediately.
    pub async fn initialize(&self) {
        if self.init_started.swap(true, Ordering::SeqCst) {
            debug!("Startup already performed; ignoring duplicate trigger");
            return;
        }

        let report = self.janitor.sweep();
        if report.evicted() > 0 {
            info!(
                "Evicted {} stale session record(s) before startup",
                report.evicted()
            );
        }

        let session = match self.auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session query failed during startup: {}", e);
                None
            }
        };
        let next = self.resolve_session(session).await;
        self.transition(next);
    }

    /// Map a session (or its absence) to a state. A missing user, a missing
    /// profile row and a failed lookup all resolve to `Unauthenticated`.
    async fn resolve_session(&self, session: Option<Session>) -> AuthState {
        let Some(user) = session.and_then(|s| s.user) else {
            return AuthState::Unauthenticated;
        };

        match self.profiles.find_by_user_id(&user.id).await {
            Ok(Some(profile)) => AuthState::Authenticated(profile),
            Ok(None) => {
                warn!("No profile found for user '{}'", user.id);
                AuthState::Unauthenticated
            }
            Err(e) => {
                warn!("Profile lookup failed for user '{}': {}", user.id, e);
                AuthState::Unauthenticated
            }
        }
    }

    fn transition(&self, next: AuthState) {
        if !self.is_active() {
            debug!("Ignoring state transition after shutdown");
            return;
        }
        let previous = self.state.send_replace(next);
        let current = self.state.borrow();
        if previous != *current {
            info!("Auth state: {} -> {}", previous.name(), current.name());
        }
    }

    /// Apply an auth change notification from the Auth Service, using the
    /// same session-to-state mapping as startup but without re-running the
    /// janitor sweep. A no-op after shutdown.
    pub async fn handle_auth_change(&self, event: AuthChangeEvent, session: Option<Session>) {
        if !self.is_active() {
            debug!("Ignoring auth change after shutdown");
            return;
        }
        debug!("Auth change received: {:?}", event);
        let next = self.resolve_session(session).await;
        self.transition(next);
    }

    /// Re-validate the session after the application regained visibility,
    /// catching tokens that expired silently in the background. The
    /// refreshed session forces a transition only when it maps to a
    /// different state than the current one.
    pub async fn handle_visibility_regained(&self) {
        if !self.is_active() {
            return;
        }
        debug!("Application became visible; re-validating session");

        let session = match self.auth.get_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session refresh on visibility regain failed: {}", e);
                return;
            }
        };
        let next = self.resolve_session(session).await;
        if next != self.current_state() {
            self.transition(next);
        }
    }

    /// Sign out with the Auth Service and drop to `Unauthenticated`.
    /// Provider failures are logged; the local state transitions regardless.
    pub async fn logout(&self) {
        if let Err(e) = self.auth.sign_out().await {
            warn!("Sign-out request failed: {}", e);
        }
        self.transition(AuthState::Unauthenticated);
    }

    /// Subscribe to the Auth Service change stream and spawn the task that
    /// feeds it into `handle_auth_change`. Attaching twice is a no-op.
    pub fn attach(self: &Arc<Self>) {
        let mut pump = self.pump.lock().expect("pump mutex poisoned");
        if pump.is_some() {
            debug!("Change stream already attached");
            return;
        }

        let mut subscription = self.auth.on_auth_state_change();
        let controller = Arc::clone(self);
        *pump = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = controller.shutdown_signal.notified() => {
                        subscription.unsubscribe();
                        break;
                    }
                    next = subscription.next_event() => {
                        let Some((event, session)) = next else {
                            // Provider side closed the stream.
                            break;
                        };
                        if !controller.is_active() {
                            subscription.unsubscribe();
                            break;
                        }
                        controller.handle_auth_change(event, session).await;
                    }
                }
            }
            debug!("Auth change stream detached; event pump exiting");
        }));
    }

    /// Tear the controller down: no further transitions are applied, and
    /// the pump is woken to unsubscribe from the change stream, so the
    /// provider sees the listener as closed. Idempotent.
    pub fn shutdown(&self) {
        self.active.store(false, Ordering::SeqCst);
        // The permit is stored, so the pump unsubscribes even if it is
        // attached or mid-event at this point.
        self.shutdown_signal.notify_one();
    }
}
