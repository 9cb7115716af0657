//! Windows Credential Manager / Linux Secret Service backend
//!
//! Both go through the `keyring` crate, which picks the platform store at
//! build time. Without the `native-keyring` feature the backend cannot be
//! opened and the selector never offers it.

use super::backend::BackendKind;
use super::secret_backend::{Item, SecretBackend};
use super::services::ServiceDescriptor;
use crate::error::{Error, Result};

/// Native keyring bound to one service id
pub struct NativeBackend {
    kind: BackendKind,
    service: &'static str,
    #[cfg_attr(not(feature = "native-keyring"), allow(dead_code))]
    label: &'static str,
    #[cfg_attr(not(feature = "native-keyring"), allow(dead_code))]
    description: &'static str,
}

impl NativeBackend {
    /// Open the native store for a service
    #[cfg(feature = "native-keyring")]
    pub fn open(kind: BackendKind, service: &ServiceDescriptor) -> Result<Self> {
        Ok(Self {
            kind,
            service: service.name,
            label: service.label,
            description: service.description,
        })
    }

    /// Open the native store for a service
    #[cfg(not(feature = "native-keyring"))]
    pub fn open(kind: BackendKind, service: &ServiceDescriptor) -> Result<Self> {
        let _ = kind;
        Err(Error::BackendOpen {
            service: service.name.to_string(),
            message: "built without the native-keyring feature".to_string(),
        })
    }

    #[cfg(feature = "native-keyring")]
    fn entry(&self, key: &str) -> std::result::Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(self.service, key)
    }
}

#[cfg(feature = "native-keyring")]
impl SecretBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn get(&self, key: &str) -> Result<Option<Item>> {
        let read_error = |e: keyring::Error| Error::BackendRead {
            service: self.service.to_string(),
            message: format!("{} error: {}", self.kind, e),
        };

        match self.entry(key).map_err(read_error)?.get_password() {
            Ok(data) => Ok(Some(Item {
                key: key.to_string(),
                data,
                label: self.label.to_string(),
                description: self.description.to_string(),
            })),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(read_error(e)),
        }
    }

    fn set(&self, item: Item) -> Result<()> {
        let write_error = |e: keyring::Error| Error::BackendWrite {
            service: self.service.to_string(),
            message: format!("{} error: {}", self.kind, e),
        };

        self.entry(&item.key)
            .map_err(write_error)?
            .set_password(&item.data)
            .map_err(write_error)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let write_error = |e: keyring::Error| Error::BackendWrite {
            service: self.service.to_string(),
            message: format!("{} error: {}", self.kind, e),
        };

        match self.entry(key).map_err(write_error)?.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(write_error(e)),
        }
    }
}

#[cfg(not(feature = "native-keyring"))]
impl SecretBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn get(&self, _key: &str) -> Result<Option<Item>> {
        Err(Error::BackendRead {
            service: self.service.to_string(),
            message: "native keyring not available".to_string(),
        })
    }

    fn set(&self, _item: Item) -> Result<()> {
        Err(Error::BackendWrite {
            service: self.service.to_string(),
            message: "native keyring not available".to_string(),
        })
    }

    fn remove(&self, _key: &str) -> Result<bool> {
        Err(Error::BackendWrite {
            service: self.service.to_string(),
            message: "native keyring not available".to_string(),
        })
    }
}
