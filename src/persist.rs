//! Chain collection persistence.
//!
//! The store hands the whole collection to a [`ChainPersistence`] backend on
//! every mutation. [`JsonFileStore`] writes it as one JSON document:
//!
//! ```json
//! { "chains": [ { "name": "greet", "commands": ["Hello", "{enter}"] } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::chain::Chain;
use crate::error::StoreError;

/// Backend that round-trips the full chain collection.
pub trait ChainPersistence: Send + Sync {
    /// Load the stored collection. A store that was never written is empty.
    fn load(&self) -> Result<Vec<Chain>, StoreError>;

    /// Replace the stored collection.
    fn save(&self, chains: &[Chain]) -> Result<(), StoreError>;

    /// Whether a collection was ever written, even an empty one.
    fn exists(&self) -> bool;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChainFile {
    #[serde(default)]
    chains: Vec<Chain>,
}

/// Collection stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ChainPersistence for JsonFileStore {
    fn load(&self) -> Result<Vec<Chain>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let file: ChainFile = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(file.chains)
    }

    fn save(&self, chains: &[Chain]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let file = ChainFile {
            chains: chains.to_vec(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        // Write-then-rename so a crash never leaves a truncated file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// In-memory backend with failure injection.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    saved: Mutex<Vec<Chain>>,
    failing: AtomicBool,
    writes: AtomicUsize,
    written: AtomicBool,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-persisted collection.
    pub fn with_chains(chains: Vec<Chain>) -> Self {
        Self {
            saved: Mutex::new(chains),
            written: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// Make every subsequent load/save fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Last successfully persisted collection.
    pub fn saved(&self) -> Vec<Chain> {
        self.saved.lock().clone()
    }

    /// Number of successful saves.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store marked failing".into()))
        } else {
            Ok(())
        }
    }
}

impl ChainPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<Chain>, StoreError> {
        self.check()?;
        Ok(self.saved())
    }

    fn save(&self, chains: &[Chain]) -> Result<(), StoreError> {
        self.check()?;
        *self.saved.lock() = chains.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.written.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn exists(&self) -> bool {
        self.written.load(Ordering::SeqCst)
    }
}

impl<T: ChainPersistence + ?Sized> ChainPersistence for std::sync::Arc<T> {
    fn load(&self) -> Result<Vec<Chain>, StoreError> {
        (**self).load()
    }

    fn save(&self, chains: &[Chain]) -> Result<(), StoreError> {
        (**self).save(chains)
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(name: &str, commands: &[&str]) -> Chain {
        Chain::new(name, commands.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("chains.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn empty_collection_still_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("chains.json"));
        assert!(!store.exists());
        store.save(&[]).unwrap();
        assert!(store.exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn file_roundtrip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("chains.json"));
        let chains = vec![
            chain("zeta", &["b", "a"]),
            chain("alpha", &["{enter}"]),
        ];
        store.save(&chains).unwrap();
        assert_eq!(store.load().unwrap(), chains);
        assert!(!dir.path().join("nested").join("chains.json.tmp").exists());
    }

    #[test]
    fn file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.json");
        JsonFileStore::new(&path)
            .save(&[chain("greet", &["Hello", "{enter}"])])
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "chains": [ { "name": "greet", "commands": ["Hello", "{enter}"] } ] })
        );
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn file_without_chains_key_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(JsonFileStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn memory_failure_injection() {
        let mem = MemoryPersistence::new();
        mem.save(&[chain("a", &["x"])]).unwrap();
        mem.set_failing(true);
        assert!(mem.save(&[]).is_err());
        assert!(mem.load().is_err());
        assert_eq!(mem.saved().len(), 1);
        assert_eq!(mem.writes(), 1);
    }
}
