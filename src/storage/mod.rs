//! Client-local key/value storage
//!
//! Plays the role browser local storage plays for a web front end: small
//! JSON documents under fixed keys. Two backends:
//! - [`FileStorage`]: one `<key>.json` file per key in the data directory
//! - [`MemoryStorage`]: in-process map, used by tests and benches
//!
//! Data directory: platform-specific local data directories
//! - macOS: `~/Library/Application Support/convert-desk/`
//! - Linux: `~/.local/share/convert-desk/`
//! - Windows: `%LOCALAPPDATA%\convert-desk\`

pub mod file;

use std::collections::HashMap;

use anyhow::Result;
pub use file::FileStorage;

/// Minimal key/value contract shared by all backends.
pub trait Storage {
    /// Read the value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get("theme").unwrap(), None);

        storage.set("theme", "\"dark\"").unwrap();
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("\"dark\""));

        storage.remove("theme").unwrap();
        storage.remove("theme").unwrap();
        assert_eq!(storage.get("theme").unwrap(), None);
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn write_through<S: Storage>(mut storage: S) {
            storage.set("k", "v").unwrap();
        }

        let mut storage = MemoryStorage::new();
        write_through(&mut storage);
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }
}
