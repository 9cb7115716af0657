//! Keyring - expiring API tokens in OS-native secret stores
//!
//! Tokens are kept in the first usable backend, in preference order:
//! - macOS Keychain (dedicated, non-syncing keychain)
//! - Windows Credential Manager
//! - Linux Secret Service (GNOME Keyring / KWallet)
//! - Encrypted file fallback (AES-256-GCM, unlocked with the profile PIN)
//!
//! Every stored value carries its own expiry as `"<unix-expire>  <secret>"`.
//! Expired values stay in the backend until they are overwritten.

#![forbid(unsafe_code)]

mod backend;
mod credential;
mod encrypted_file;
mod keychain;
mod memory;
mod native;
mod secret_backend;
mod services;
mod store;
mod tool;
mod unlock;


// Re-export all public types
pub use backend::{available_backends, pin_required, BackendKind, HostPlatform, OsFamily};
pub use credential::{Credential, TOKEN_LIFETIME_HOURS, VALUE_SEPARATOR};
pub use encrypted_file::{EncryptedFileBackend, PasswordCallback};
pub use keychain::{KeychainBackend, KEYCHAIN_NAME, SECURITY_TOOL};
pub use memory::MemoryBackend;
pub use native::NativeBackend;
pub use secret_backend::{open_backend, Item, SecretBackend};
pub use services::ServiceDescriptor;
pub use store::{entry_key, CredentialStore, KeyScheme};
pub use tool::{SystemRunner, ToolOutput, ToolRunner};
pub use unlock::{sequencer_for, KeychainUnlock, NoUnlock, UnlockSequencer};
