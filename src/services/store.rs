//! Flat key-value store persisted as a JSON object of strings

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};

use tracing::{debug, warn};

use crate::error::StoreError;

/// String-keyed settings store.
///
/// An absent or malformed file loads as an empty store so callers fall back
/// to their defaults.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl KeyValueStore {
    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store backed by `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring malformed store {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Failed to read store {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            values,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Read a `"true"`/`"false"` value, falling back on anything else
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some("true") => true,
            Some("false") => false,
            _ => default,
        }
    }

    /// Set a value. Returns `true` if it changed.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.get(key) == Some(value.as_str()) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }

    /// Write the store to its file, creating parent directories as needed
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, text)?;

        debug!("Store written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open(dir.path().join("absent.json"));
        assert_eq!(store.get("clock.utc"), None);
        assert!(!store.get_bool("clock.utc", false));
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        let store = KeyValueStore::open(&path);
        assert!(store.get_bool("clock.hour24", true));
        assert_eq!(store.get("clock.hour24"), None);
    }

    #[test]
    fn test_non_string_values_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"clock.utc": true}"#).unwrap();

        let store = KeyValueStore::open(&path);
        assert_eq!(store.get("clock.utc"), None);
    }

    #[test]
    fn test_flush_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = KeyValueStore::open(&path);
        assert!(store.set("clock.utc", "true"));
        assert!(!store.set("clock.utc", "true"));
        store.set("countdown.last_input", "0:5:0");
        store.flush().unwrap();

        let reloaded = KeyValueStore::open(&path);
        assert!(reloaded.get_bool("clock.utc", false));
        assert_eq!(reloaded.get("countdown.last_input"), Some("0:5:0"));
    }

    #[test]
    fn test_unparseable_bool_uses_default() {
        let mut store = KeyValueStore::in_memory();
        store.set("clock.hour24", "yes");
        assert!(!store.get_bool("clock.hour24", false));
        // in-memory flush is a no-op
        store.flush().unwrap();
    }
}
