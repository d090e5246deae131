use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the persisted session records live:
/// - path: a JSON snapshot file backing the store.
/// - no path: a transient in-memory store.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub path: Option<String>,
}
