//! Secret backend trait definition
//!
//! Every backend kind implements the same get/set/remove capability; the
//! credential store holds one boxed backend per service.

use super::backend::BackendKind;
use super::encrypted_file::{EncryptedFileBackend, PasswordCallback};
use super::keychain::KeychainBackend;
use super::memory::MemoryBackend;
use super::native::NativeBackend;
use super::services::ServiceDescriptor;
use super::tool::SystemRunner;
use crate::context::HalpContext;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single backend entry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Entry key within the service
    pub key: String,
    /// Serialized value (`"<expire>  <secret>"`)
    pub data: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Display description
    #[serde(default)]
    pub description: String,
}

impl Item {
    /// Create an item labelled after its service
    #[must_use]
    pub fn new(key: impl Into<String>, data: impl Into<String>, service: &ServiceDescriptor) -> Self {
        Self {
            key: key.into(),
            data: data.into(),
            label: service.label.to_string(),
            description: service.description.to_string(),
        }
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("key", &self.key)
            .field("data", &"[REDACTED]")
            .field("label", &self.label)
            .finish()
    }
}

/// Abstraction over secret storage backends
///
/// A backend instance is bound to exactly one service id.
pub trait SecretBackend: Send + Sync {
    /// Which kind of backend this is
    fn kind(&self) -> BackendKind;

    /// Fetch an entry
    ///
    /// # Returns
    /// `Some(Item)` if found, `None` if the backend has no such key
    ///
    /// # Errors
    /// Returns `Error::BackendRead` if the backend fails
    fn get(&self, key: &str) -> Result<Option<Item>>;

    /// Store an entry, replacing any previous value under the same key
    ///
    /// # Errors
    /// Returns `Error::BackendWrite` if the backend fails
    fn set(&self, item: Item) -> Result<()>;

    /// Remove an entry
    ///
    /// # Returns
    /// `true` if an entry was removed, `false` if none existed
    ///
    /// # Errors
    /// Returns `Error::BackendWrite` if the backend fails
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Open a backend of the given kind for one service
///
/// `password` is only consulted by the file backend.
pub fn open_backend(
    kind: BackendKind,
    service: &ServiceDescriptor,
    ctx: &HalpContext,
    password: PasswordCallback,
) -> Result<Box<dyn SecretBackend>> {
    match kind {
        BackendKind::Keychain => Ok(Box::new(KeychainBackend::new(service, SystemRunner))),
        BackendKind::WinCred | BackendKind::SecretService => {
            Ok(Box::new(NativeBackend::open(kind, service)?))
        }
        BackendKind::File => Ok(Box::new(EncryptedFileBackend::open(
            &ctx.file_backend_dir(),
            service,
            password,
        )?)),
        BackendKind::Memory => Ok(Box::new(MemoryBackend::new())),
    }
}
