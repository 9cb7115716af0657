//! In-memory backend (for testing)

use super::backend::BackendKind;
use super::secret_backend::{Item, SecretBackend};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Backend keeping entries in a shared map
///
/// Clones share the same entries, so a test can keep a handle and inspect
/// what the credential store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<String, Item>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Raw stored entry, bypassing decoding
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Item> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }
}

fn handle_lock_poison<T>(e: PoisonError<T>) -> Error {
    Error::BackendWrite {
        service: "memory".to_string(),
        message: format!("lock poisoned: {}", e),
    }
}

impl SecretBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn get(&self, key: &str) -> Result<Option<Item>> {
        let entries = self.entries.read().map_err(handle_lock_poison)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, item: Item) -> Result<()> {
        let mut entries = self.entries.write().map_err(handle_lock_poison)?;
        entries.insert(item.key.clone(), item);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(handle_lock_poison)?;
        Ok(entries.remove(key).is_some())
    }
}
