use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// LoggingConfig controls how the tracing subscriber is set up.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct LoggingConfig {
    /// Minimum level to emit: "trace", "debug", "info", "warn" or "error".
    pub level: String,
    /// "json" for structured output, "console" for human-readable output
    /// (unknown values fall back to console).
    pub format: String,
}
