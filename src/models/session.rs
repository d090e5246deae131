use serde::{Deserialize, Serialize};

/// Audience value the identity provider stamps on fully authenticated users.
/// Anonymous and intermediate sessions carry other audiences (e.g. "anon").
pub const AUTHENTICATED_AUD: &str = "authenticated";

/// The user embedded in a session, as the Auth Service returns it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
}

impl SessionUser {
    /// True when the audience marks this user as fully authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.aud.as_deref() == Some(AUTHENTICATED_AUD)
    }
}

/// A cached authentication session. The same shape is persisted under the
/// `sb-<project>-auth-token` keys and returned by the Auth Service, so one
/// type covers both; unknown fields in stored records are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    #[serde(default)]
    pub user: Option<SessionUser>,
    /// Expiry as epoch seconds. Absent means no local expiry is enforced.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    /// Whether the session expired before `now` (epoch seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}
