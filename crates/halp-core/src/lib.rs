//! Halp Core - credential store and profile settings
//!
//! This crate provides the pieces the `halp` CLI needs before it can talk to
//! Jira or Tempo:
//! - Settings: the on-disk profile (identity, Jira instance, file PIN)
//! - Keyring: expiring API tokens stored in an OS-native secret backend
//! - Unlock: one-time keychain configuration on macOS
//! - Prompt: validated interactive input
//!
//! Everything here is synchronous. A `HalpContext` is built once at startup
//! and passed explicitly to every call that needs the host environment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod keyring;
pub mod prompt;
pub mod settings;

pub use context::HalpContext;
pub use error::{format_error_for_cli, Error, Result, UserFriendlyError};
pub use keyring::{
    available_backends, pin_required, sequencer_for, BackendKind, Credential, CredentialStore,
    HostPlatform, KeyScheme, OsFamily, ServiceDescriptor, UnlockSequencer,
};
pub use prompt::{Prompter, TerminalPrompter};
pub use settings::{ensure_layout, load, Profile, VersionStamp};

/// Application name used for directories, keychains and log targets
pub const APP_NAME: &str = "halp";
