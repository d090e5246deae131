//! Session store janitor.
//!
//! Sweeps the persisted key-value store and evicts every cached session
//! record that is expired, unauthenticated, or corrupt, so the store never
//! retains a record that could break the next login. Eviction is the only
//! side effect; per-record failures are logged and absorbed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::models::Session;
use crate::store::KeyValueStore;

const SESSION_KEY_PREFIX: &str = "sb-";
const SESSION_KEY_SUFFIX: &str = "-auth-token";

/// Returns true for keys shaped like `sb-<project>-auth-token`, the pattern
/// the Auth Service persists its session records under. All other keys are
/// out of scope for the janitor.
pub fn is_session_key(key: &str) -> bool {
    key.starts_with(SESSION_KEY_PREFIX) && key.ends_with(SESSION_KEY_SUFFIX)
}

/// Classification of one persisted session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Fresh and authenticated; retained.
    Valid,
    /// `expires_at` lies in the past.
    Expired,
    /// No user, or an audience other than "authenticated".
    Unauthenticated,
    /// The stored value is not parseable as a session.
    Corrupt,
}

/// Classify one raw record value against `now` (epoch seconds).
pub fn classify(raw: &str, now: i64) -> RecordStatus {
    let session: Session = match serde_json::from_str(raw) {
        Ok(session) => session,
        Err(e) => {
            warn!("Failed to parse cached session record: {}", e);
            return RecordStatus::Corrupt;
        }
    };

    if session.is_expired(now) {
        return RecordStatus::Expired;
    }
    match session.user {
        Some(ref user) if user.is_authenticated() => RecordStatus::Valid,
        _ => RecordStatus::Unauthenticated,
    }
}

/// Counters describing the outcome of a single sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub retained: usize,
    pub evicted_expired: usize,
    pub evicted_unauthenticated: usize,
    pub evicted_corrupt: usize,
}

impl SweepReport {
    /// Total number of records deleted by the sweep.
    pub fn evicted(&self) -> usize {
        self.evicted_expired + self.evicted_unauthenticated + self.evicted_corrupt
    }
}

/// Sweeps session records out of an injected persisted store.
pub struct Janitor {
    store: Arc<dyn KeyValueStore>,
}

impl Janitor {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Janitor { store }
    }

    /// Sweep against the current wall clock.
    pub fn sweep(&self) -> SweepReport {
        self.sweep_at(Utc::now().timestamp())
    }

    /// Sweep against an explicit clock (epoch seconds). The key set is
    /// snapshotted up front, so the evictions below can shrink the store
    /// without skipping or double-processing entries.
    pub fn sweep_at(&self, now: i64) -> SweepReport {
        let mut report = SweepReport::default();

        for key in self.store.keys() {
            if !is_session_key(&key) {
                continue;
            }
            report.scanned += 1;

            let Some(raw) = self.store.get(&key) else {
                // Gone between snapshot and read; nothing left to do.
                continue;
            };

            match classify(&raw, now) {
                RecordStatus::Valid => report.retained += 1,
                RecordStatus::Expired => {
                    warn!("Evicting expired session record '{}'", key);
                    self.store.delete(&key);
                    report.evicted_expired += 1;
                }
                RecordStatus::Unauthenticated => {
                    warn!("Evicting unauthenticated session record '{}'", key);
                    self.store.delete(&key);
                    report.evicted_unauthenticated += 1;
                }
                RecordStatus::Corrupt => {
                    warn!("Evicting corrupt session record '{}'", key);
                    self.store.delete(&key);
                    report.evicted_corrupt += 1;
                }
            }
        }

        debug!(
            "Sweep finished: {} scanned, {} retained, {} evicted",
            report.scanned,
            report.retained,
            report.evicted()
        );
        report
    }
}
