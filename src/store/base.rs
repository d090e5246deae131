use std::sync::Arc;

use tracing::{error, info};

use super::{FileStore, MemoryStore};
use crate::config::StoreConfig;

/// The KeyValueStore trait abstracts the persisted session store: browser
/// local storage in the original environment, a file or in-memory map here.
/// Keys matching `sb-<project>-auth-token` are written by the Auth Service
/// and read (and possibly deleted) by the janitor; all other keys are left
/// alone by this crate.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn delete(&self, key: &str);
    /// All keys present at call time, in the store's stable order.
    fn keys(&self) -> Vec<String>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates a concrete store implementation based on the StoreConfig.
/// With a configured path the store is a JSON snapshot file; without one
/// it is a transient in-memory map.
pub fn create_store(config: &StoreConfig) -> Arc<dyn KeyValueStore> {
    match &config.path {
        Some(path) => match FileStore::open(path) {
            Ok(store) => {
                info!("Opened session store at '{}'", path);
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to open session store '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => {
            info!("No store path configured. Using in-memory store.");
            Arc::new(MemoryStore::new())
        }
    }
}
