use std::sync::Mutex;

use super::KeyValueStore;

/// An in-memory key-value store with insertion-ordered keys, mirroring the
/// semantics of browser local storage. Also the test stand-in for it.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().expect("memory store mutex poisoned");
        entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().expect("memory store mutex poisoned");
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().expect("memory store mutex poisoned");
        entries.retain(|(k, _)| k != key);
    }

    fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().expect("memory store mutex poisoned");
        entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn len(&self) -> usize {
        let entries = self.entries.lock().expect("memory store mutex poisoned");
        entries.len()
    }
}
