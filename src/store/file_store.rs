//! A file-backed key-value store, persisting records as a JSON snapshot.
//!
//! The snapshot is an array of `[key, value]` pairs so the key order
//! survives round-trips. Every mutation is written through.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::error;

use super::KeyValueStore;

pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Vec<(String, String)>>,
}

impl FileStore {
    /// Open a store backed by `path`. A missing file starts the store
    /// empty; the file is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| format!("Error reading store file: {}", e))?;
            serde_json::from_str(&raw).map_err(|e| format!("Error parsing store file: {}", e))?
        } else {
            Vec::new()
        };
        Ok(FileStore {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn save(&self, entries: &[(String, String)]) {
        match serde_json::to_string_pretty(entries) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    error!("Failed to write store file '{}': {}", self.path.display(), e);
                }
            }
            Err(e) => error!("Failed to serialize store contents: {}", e),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().expect("file store mutex poisoned");
        entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().expect("file store mutex poisoned");
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
        self.save(&entries);
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().expect("file store mutex poisoned");
        entries.retain(|(k, _)| k != key);
        self.save(&entries);
    }

    fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().expect("file store mutex poisoned");
        entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn len(&self) -> usize {
        let entries = self.entries.lock().expect("file store mutex poisoned");
        entries.len()
    }
}
