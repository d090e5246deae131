//! Profile lookup against a PostgREST-style endpoint.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::ProfileStore;
use crate::models::Profile;

fn default_table() -> String {
    "profiles".to_string()
}

/// The config needed for the profile lookup endpoint.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ProfileStoreConfig {
    /// Base URL, usually the same project URL the auth client uses.
    pub url: String,
    /// The public (anon) API key sent with every request.
    pub anon_key: String,
    /// Table holding the profile rows.
    #[serde(default = "default_table")]
    pub table: String,
}

/// A profile store that queries `GET /rest/v1/<table>?id=eq.<id>`.
pub struct RestProfileStore {
    config: ProfileStoreConfig,
    client: reqwest::Client,
}

impl RestProfileStore {
    pub fn new(config: ProfileStoreConfig) -> Self {
        RestProfileStore {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ProfileStore for RestProfileStore {
    async fn find_by_user_id(&self, id: &str) -> Result<Option<Profile>, String> {
        let url = format!(
            "{}/rest/v1/{}?id=eq.{}&limit=1",
            self.config.url, self.config.table, id
        );
        debug!("Sending profile lookup request to: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.config.anon_key))
            .send()
            .await
            .map_err(|e| format!("Error sending profile request: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Unexpected status code: {}", response.status()));
        }

        let rows: Vec<Profile> = response
            .json()
            .await
            .map_err(|e| format!("Error parsing profile response: {}", e))?;
        Ok(rows.into_iter().next())
    }
}
