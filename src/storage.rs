//! Key-value persistence behind the client-local state (history, theme).
//! Injected everywhere it is used so tests can swap in the in-memory double.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, warn};

pub const THEME_KEY: &str = "pixelbloom.theme";
const DEFAULT_THEME: &str = "dark";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Single-file JSON store. Write errors are logged and swallowed: losing a
/// history entry is acceptable in this app, crashing is not.
pub struct FileStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "discarding unparseable store file");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    fn flush(&self, cache: &HashMap<String, String>) {
        match serde_json::to_string_pretty(cache) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    error!(path = %self.path.display(), error = %e, "failed to persist store");
                }
            }
            Err(e) => error!(error = %e, "failed to serialize store"),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut cache = self.cache.write();
        cache.insert(key.to_string(), value.to_string());
        self.flush(&cache);
    }

    fn remove(&self, key: &str) {
        let mut cache = self.cache.write();
        cache.remove(key);
        self.flush(&cache);
    }
}

/// Test double with no disk backing.
#[derive(Default)]
pub struct MemoryStore {
    cache: RwLock<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.cache.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.cache.write().remove(key);
    }
}

/// The persisted theme preference, surviving reloads alongside the history.
pub struct Preferences {
    kv: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn theme(&self) -> String {
        self.kv
            .get(THEME_KEY)
            .unwrap_or_else(|| DEFAULT_THEME.to_string())
    }

    pub fn set_theme(&self, theme: &str) {
        self.kv.set(THEME_KEY, theme);
    }
}
