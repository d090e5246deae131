//! A client for the GoTrue session endpoints.
//!
//! The client owns the persisted session record for its project: it reads
//! the record back for `get_session`, exchanges the refresh token when the
//! record expired, and clears it on sign-out. Auth change events observed
//! along the way are fanned out to every live subscription.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::base::{AuthChangeEvent, AuthService, AuthSubscription};
use crate::models::{Session, SessionUser};
use crate::store::KeyValueStore;

/// The config needed for the GoTrue auth client.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct GoTrueConfig {
    /// Base URL of the identity provider, e.g. `https://<ref>.supabase.co`.
    pub url: String,
    /// The public (anon) API key sent with every request.
    pub anon_key: String,
    /// Project reference used to derive the persisted record key.
    pub project_ref: String,
}

impl GoTrueConfig {
    /// Key the provider persists its session record under.
    pub fn storage_key(&self) -> String {
        format!("sb-{}-auth-token", self.project_ref)
    }
}

/// The body of a successful token-grant response. GoTrue versions differ
/// on whether `expires_at` is included, so it is derived from `expires_in`
/// when missing.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    #[serde(default)]
    user: Option<SessionUser>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Session {
        let expires_at = self.expires_at.or_else(|| self.expires_in.map(|d| now + d));
        Session {
            user: self.user,
            expires_at,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
        }
    }
}

pub struct GoTrueClient {
    config: GoTrueConfig,
    store: Arc<dyn KeyValueStore>,
    client: reqwest::Client,
    listeners: Mutex<Vec<mpsc::UnboundedSender<(AuthChangeEvent, Option<Session>)>>>,
}

impl GoTrueClient {
    pub fn new(config: GoTrueConfig, store: Arc<dyn KeyValueStore>) -> Self {
        info!(
            "Creating GoTrue client for project '{}' at '{}'",
            config.project_ref, config.url
        );
        GoTrueClient {
            config,
            store,
            client: reqwest::Client::new(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Read and parse this project's persisted record. A corrupt record is
    /// discarded on the spot.
    fn read_persisted(&self) -> Option<Session> {
        let key = self.config.storage_key();
        let raw = self.store.get(&key)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Corrupt session record under '{}', discarding: {}", key, e);
                self.store.delete(&key);
                None
            }
        }
    }

    fn persist(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(raw) => self.store.set(&self.config.storage_key(), &raw),
            Err(e) => warn!("Failed to serialize session record: {}", e),
        }
    }

    /// Fan an event out to every live subscription, dropping closed ones.
    fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        let mut listeners = self.listeners.lock().expect("listener mutex poisoned");
        listeners.retain(|tx| tx.send((event, session.clone())).is_ok());
    }

    /// Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str, now: i64) -> Result<Session, String> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.config.url);
        debug!("Sending refresh-token request to: {}", url);

        let body = serde_json::json!({ "refresh_token": refresh_token });
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Error sending refresh request: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Refresh rejected with status: {}", response.status()));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| format!("Error parsing refresh response: {}", e))?;
        Ok(token.into_session(now))
    }
}

#[async_trait]
impl AuthService for GoTrueClient {
    async fn get_session(&self) -> Result<Option<Session>, String> {
        let Some(session) = self.read_persisted() else {
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        if !session.is_expired(now) {
            return Ok(Some(session));
        }

        let key = self.config.storage_key();
        let Some(refresh_token) = session.refresh_token.clone() else {
            warn!("Expired session has no refresh token, discarding");
            self.store.delete(&key);
            return Ok(None);
        };

        debug!("Cached session expired; attempting refresh");
        match self.refresh(&refresh_token, now).await {
            Ok(refreshed) => {
                self.persist(&refreshed);
                self.emit(AuthChangeEvent::TokenRefreshed, Some(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(e) => {
                warn!("Session refresh failed, discarding cached record: {}", e);
                self.store.delete(&key);
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), String> {
        let persisted = self.read_persisted();

        // Local state is cleared regardless of how the provider call goes.
        self.store.delete(&self.config.storage_key());
        self.emit(AuthChangeEvent::SignedOut, None);

        let Some(access_token) = persisted.and_then(|s| s.access_token) else {
            debug!("No cached access token; sign-out is local only");
            return Ok(());
        };

        let url = format!("{}/auth/v1/logout", self.config.url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| format!("Error sending logout request: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Logout rejected with status: {}", response.status()));
        }
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
