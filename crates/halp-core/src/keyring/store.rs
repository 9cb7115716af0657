//! Credential store
//!
//! Holds one opened backend per known service and maps `(service, user)` to
//! an entry key. Values carry their own expiry; an expired value is reported
//! as `Error::Expired` and left in place until it is overwritten.

use super::backend::{BackendKind, OsFamily};
use super::credential::{Credential, VALUE_SEPARATOR};
use super::encrypted_file::PasswordCallback;
use super::secret_backend::{open_backend, Item, SecretBackend};
use super::services::ServiceDescriptor;
use crate::context::HalpContext;
use crate::error::{Error, Result};
use crate::prompt::{prompt_secret, Prompter};
use crate::settings::Profile;
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// How entry keys are derived from service and user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// `"<service>:<user>"`
    ServicePrefixed,
    /// `"<user>"`
    Plain,
}

impl KeyScheme {
    /// Scheme used on the given OS family
    #[must_use]
    pub fn for_os(os: OsFamily) -> Self {
        if os.is_posix_family() {
            Self::ServicePrefixed
        } else {
            Self::Plain
        }
    }
}

/// Entry key for `user` within `service`
#[must_use]
pub fn entry_key(scheme: KeyScheme, service: &str, user: &str) -> String {
    match scheme {
        KeyScheme::ServicePrefixed => format!("{}:{}", service, user),
        KeyScheme::Plain => user.to_string(),
    }
}

/// Expiring API tokens for the profile's user
pub struct CredentialStore {
    user: String,
    scheme: KeyScheme,
    handles: HashMap<&'static str, Box<dyn SecretBackend>>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut services: Vec<&&str> = self.handles.keys().collect();
        services.sort();
        f.debug_struct("CredentialStore")
            .field("user", &self.user)
            .field("scheme", &self.scheme)
            .field("services", &services)
            .finish()
    }
}

impl CredentialStore {
    /// Open a backend for every known service
    ///
    /// Uses the first of `backends` that is not the in-memory backend. A
    /// service whose backend fails to open is logged and left out; later
    /// lookups for it report `NotFound`.
    pub fn open(ctx: &HalpContext, profile: &Profile, backends: &[BackendKind]) -> Self {
        let scheme = KeyScheme::for_os(ctx.platform.os);
        let mut handles: HashMap<&'static str, Box<dyn SecretBackend>> = HashMap::new();

        let Some(kind) = backends
            .iter()
            .copied()
            .find(|kind| *kind != BackendKind::Memory)
        else {
            warn!("No secret backend available");
            return Self::with_backends(profile.user(), scheme, handles);
        };

        for service in ServiceDescriptor::all() {
            match open_backend(kind, service, ctx, pin_callback(profile.file_pin)) {
                Ok(backend) => {
                    debug!(service = %service.name, backend = ?kind, "Opened backend");
                    handles.insert(service.name, backend);
                }
                Err(e) => {
                    error!(service = %service.name, backend = ?kind, error = %e, "Failed to open backend");
                }
            }
        }

        Self::with_backends(profile.user(), scheme, handles)
    }

    /// Build a store from already opened backends
    #[must_use]
    pub fn with_backends(
        user: impl Into<String>,
        scheme: KeyScheme,
        handles: HashMap<&'static str, Box<dyn SecretBackend>>,
    ) -> Self {
        Self {
            user: user.into(),
            scheme,
            handles,
        }
    }

    /// Account the store reads and writes by default
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Entry key scheme in use
    #[must_use]
    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    /// Backend kind opened for a service, if any
    #[must_use]
    pub fn backend_kind(&self, service: &ServiceDescriptor) -> Option<BackendKind> {
        self.handles.get(service.name).map(|b| b.kind())
    }

    fn handle(&self, service: &ServiceDescriptor, key: &str) -> Result<&dyn SecretBackend> {
        self.handles
            .get(service.name)
            .map(|backend| &**backend)
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Fetch the profile user's credential for `service`
    pub fn get(&self, service: &ServiceDescriptor) -> Result<Credential> {
        self.get_for(&self.user, service)
    }

    /// Fetch `user`'s credential for `service`
    ///
    /// # Errors
    /// `NotFound` when there is no backend or no entry, `Decode` for a
    /// malformed value, `Expired` once the expiry has been reached.
    pub fn get_for(&self, user: &str, service: &ServiceDescriptor) -> Result<Credential> {
        let key = entry_key(self.scheme, service.name, user);
        let backend = self.handle(service, &key)?;

        let item = backend.get(&key)?.ok_or_else(|| Error::NotFound(key.clone()))?;
        let mut credential = Credential::decode(&item.data)?;

        if credential.is_expired_at(Utc::now().timestamp()) {
            debug!(service = %service.name, expire = credential.expire, "Credential expired");
            return Err(Error::Expired {
                service: service.name.to_string(),
                expired_at: credential.expire,
            });
        }

        credential.username = user.to_string();
        Ok(credential)
    }

    /// Store a credential, replacing any previous value
    ///
    /// # Errors
    /// `BackendWrite` when the service has no backend, the secret contains
    /// the value separator, or the backend rejects the write.
    pub fn set(
        &self,
        user: &str,
        secret: &str,
        service: &ServiceDescriptor,
        expire: i64,
    ) -> Result<Credential> {
        let write_error = |message: &str| Error::BackendWrite {
            service: service.name.to_string(),
            message: message.to_string(),
        };

        if secret.contains(VALUE_SEPARATOR) {
            return Err(write_error("secret must not contain two consecutive spaces"));
        }

        let key = entry_key(self.scheme, service.name, user);
        let backend = self
            .handles
            .get(service.name)
            .ok_or_else(|| write_error("no secret backend is open for this service"))?;
        let credential = Credential::new(user, secret, expire);

        backend.set(Item::new(key, credential.encode(), service))?;
        info!(service = %service.name, backend = ?backend.kind(), "Stored credential");
        Ok(credential)
    }

    /// Remove the profile user's credential for `service`, or for every
    /// service when given the wildcard
    ///
    /// Failures are logged and never returned.
    pub fn delete(&self, service: &ServiceDescriptor) -> Result<()> {
        if service.is_wildcard() {
            for service in ServiceDescriptor::all() {
                self.delete_one(service);
            }
        } else {
            self.delete_one(service);
        }
        Ok(())
    }

    fn delete_one(&self, service: &ServiceDescriptor) {
        let key = entry_key(self.scheme, service.name, &self.user);
        let result = self.handle(service, &key).and_then(|b| b.remove(&key));

        match result {
            Ok(true) => info!(service = %service.name, "Deleted credential"),
            Ok(false) => debug!(service = %service.name, "No credential to delete"),
            Err(e) => error!(service = %service.name, error = %e, "Failed to delete credential"),
        }
    }

    /// Tempo API token, prompting for a new one when the stored one is
    /// missing, expired or unreadable
    pub fn tempo_credential(&self, prompter: &mut dyn Prompter) -> Result<Credential> {
        self.credential_or_prompt(
            &ServiceDescriptor::TEMPO,
            prompter,
            "Please enter your Tempo Authentication Token",
        )
    }

    /// Jira API token, prompting for a new one when the stored one is
    /// missing, expired or unreadable
    pub fn jira_credential(&self, prompter: &mut dyn Prompter) -> Result<Credential> {
        self.credential_or_prompt(
            &ServiceDescriptor::JIRA,
            prompter,
            "Please enter your JIRA Authentication Token",
        )
    }

    fn credential_or_prompt(
        &self,
        service: &ServiceDescriptor,
        prompter: &mut dyn Prompter,
        message: &str,
    ) -> Result<Credential> {
        match self.get(service) {
            Ok(credential) => Ok(credential),
            Err(e) if e.is_recoverable() => {
                info!(service = %service.name, reason = %e, "Requesting new token");
                let secret = prompt_secret(prompter, message)?;
                let expire = Credential::expiry_from(Utc::now().timestamp());

                self.set(&self.user, &secret, service, expire)
            }
            Err(e) => Err(e),
        }
    }
}

/// Password callback handing the profile PIN to the file backend
fn pin_callback(pin: Option<u32>) -> PasswordCallback {
    Box::new(move |_prompt: &str| {
        pin.map(|p| p.to_string())
            .ok_or_else(|| Error::Prompt("no file pin in profile".to_string()))
    })
}
