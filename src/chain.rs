//! Named command chains and the store that owns them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use parking_lot::RwLock;

use crate::error::StoreError;
use crate::persist::ChainPersistence;
use crate::split;

/// A named, ordered list of raw command lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
    pub commands: Vec<String>,
}

impl Chain {
    pub fn new(name: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    /// Build a chain from a free-text blob (lines split on newline or `;`).
    pub fn from_blob(name: impl Into<String>, blob: &str) -> Self {
        Self::new(name, split::split_lines(blob))
    }
}

/// Store shared between the control surface and the executor.
pub type SharedStore = Arc<RwLock<ChainStore>>;

/// Ordered chain collection, written back on every mutation.
///
/// The in-memory collection is authoritative. A failed write is logged and
/// leaves the mutation in place; the next successful write catches the
/// backend up, so persisted state can lag but never lead.
pub struct ChainStore {
    chains: Vec<Chain>,
    persistence: Box<dyn ChainPersistence>,
    synced: bool,
    /// Nothing was ever persisted: the first run, when presets apply
    fresh: bool,
}

impl ChainStore {
    /// Load the collection from `persistence`.
    pub fn open(persistence: impl ChainPersistence + 'static) -> Result<Self, StoreError> {
        let fresh = !persistence.exists();
        let chains = persistence.load()?;
        info!("Loaded {} chain(s)", chains.len());
        Ok(Self {
            chains,
            persistence: Box::new(persistence),
            synced: true,
            fresh,
        })
    }

    /// Wrap the store for sharing across tasks.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Create or replace `name` with the lines of `blob`.
    pub fn save(&mut self, name: &str, blob: &str) -> &Chain {
        self.save_lines(name, split::split_lines(blob))
    }

    /// Create or replace `name` with already-split lines.
    pub fn save_lines(&mut self, name: &str, commands: Vec<String>) -> &Chain {
        let index = match self.position(name) {
            Some(i) => {
                self.chains[i].commands = commands;
                i
            }
            None => {
                self.chains.push(Chain::new(name, commands));
                self.chains.len() - 1
            }
        };
        self.persist();
        &self.chains[index]
    }

    /// First chain whose name matches exactly.
    pub fn get(&self, name: &str) -> Option<&Chain> {
        self.chains.iter().find(|c| c.name == name)
    }

    pub fn list(&self) -> &[Chain] {
        &self.chains
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Remove `name`. Returns false (and writes nothing) when absent.
    pub fn delete(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) => {
                self.chains.remove(i);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Seed preset chains into a store that was never written. Returns how
    /// many were added. A collection the user emptied stays empty.
    pub fn seed(&mut self, presets: impl IntoIterator<Item = Chain>) -> usize {
        if !self.fresh || !self.chains.is_empty() {
            return 0;
        }
        self.fresh = false;
        self.chains.extend(presets);
        if !self.chains.is_empty() {
            info!("Seeded {} preset chain(s)", self.chains.len());
            self.persist();
        }
        self.chains.len()
    }

    /// Whether the last write to the backend succeeded.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.chains.iter().position(|c| c.name == name)
    }

    fn persist(&mut self) {
        match self.persistence.save(&self.chains) {
            Ok(()) => {
                self.synced = true;
                self.fresh = false;
            }
            Err(e) => {
                warn!("Failed to persist chains (keeping in-memory state): {e}");
                self.synced = false;
            }
        }
    }
}
