//! Persisted preferences.
//!
//! The table persists exactly one value, its sort, through a small
//! string key-value [`PreferenceStore`]. [`MemoryStore`] keeps entries in
//! memory and [`JsonFileStore`] keeps them in a JSON object on disk.
//!
//! Reads and writes through [`load_sort`] / [`save_sort`] never fail: a
//! missing, unreadable or corrupt entry means "no sort", and write failures
//! are logged and dropped.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::sort::SortSpec;

/// Default key the sort preference is stored under.
pub const DEFAULT_SORT_KEY: &str = "userTableSort";

/// String key-value store for preferences.
pub trait PreferenceStore: Send + Sync {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store. Entries live as long as the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.into(), value.into());
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON object of string entries.
///
/// The file is read on every access and rewritten on every change, so
/// several stores (or sessions) pointed at the same path see each other's
/// writes, last writer wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Reads the persisted sort under `key`.
///
/// Falls back to `None` when the entry is absent, JSON `null`, corrupt, or
/// the store itself fails.
pub fn load_sort(store: &dyn PreferenceStore, key: &str) -> Option<SortSpec> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "error reading sort preference");
            return None;
        }
    };

    match serde_json::from_str::<Option<SortSpec>>(&raw) {
        Ok(spec) => spec,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring corrupt sort preference");
            None
        }
    }
}

/// Persists `spec` under `key`, or removes the entry for `None`.
///
/// Failures are logged and otherwise ignored.
pub fn save_sort(store: &dyn PreferenceStore, key: &str, spec: Option<&SortSpec>) {
    let outcome = match spec {
        Some(spec) => serde_json::to_string(spec)
            .map_err(Error::from)
            .and_then(|json| store.set(key, &json)),
        None => store.remove(key),
    };

    if let Err(e) = outcome {
        tracing::warn!(key, error = %e, "error writing sort preference");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::Direction;

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Io(std::io::Error::other("storage unavailable")))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::other("quota exceeded")))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::other("storage unavailable")))
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn sort_round_trips_exactly() {
        let store = MemoryStore::new();
        let spec = SortSpec::new("email", Direction::Desc);
        save_sort(&store, DEFAULT_SORT_KEY, Some(&spec));

        assert_eq!(
            store.get(DEFAULT_SORT_KEY).unwrap().as_deref(),
            Some(r#"{"field":"email","direction":"desc"}"#)
        );
        assert_eq!(load_sort(&store, DEFAULT_SORT_KEY), Some(spec));
    }

    #[test]
    fn saving_none_removes_entry() {
        let store = MemoryStore::with_entry(DEFAULT_SORT_KEY, r#"{"field":"name","direction":"asc"}"#);
        save_sort(&store, DEFAULT_SORT_KEY, None);
        assert_eq!(store.get(DEFAULT_SORT_KEY).unwrap(), None);
    }

    #[test]
    fn null_and_corrupt_entries_fall_back() {
        let null = MemoryStore::with_entry(DEFAULT_SORT_KEY, "null");
        assert_eq!(load_sort(&null, DEFAULT_SORT_KEY), None);

        let corrupt = MemoryStore::with_entry(DEFAULT_SORT_KEY, "{not json");
        assert_eq!(load_sort(&corrupt, DEFAULT_SORT_KEY), None);

        let wrong_direction =
            MemoryStore::with_entry(DEFAULT_SORT_KEY, r#"{"field":"name","direction":"up"}"#);
        assert_eq!(load_sort(&wrong_direction, DEFAULT_SORT_KEY), None);
    }

    #[test]
    fn broken_store_never_propagates() {
        assert_eq!(load_sort(&BrokenStore, DEFAULT_SORT_KEY), None);
        save_sort(&BrokenStore, DEFAULT_SORT_KEY, Some(&SortSpec::asc("name")));
        save_sort(&BrokenStore, DEFAULT_SORT_KEY, None);
    }
}
