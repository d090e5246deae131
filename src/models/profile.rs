use serde::{Deserialize, Serialize};

/// Visibility of a profile to other users.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
}

/// The minimal profile row fetched once a session is confirmed present.
/// Held by the controller for the duration of the authenticated session
/// and discarded on logout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub privacy: ProfileVisibility,
}
