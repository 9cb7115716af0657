//! Error types for halp-core
//!
//! This module provides the error taxonomy shared by the settings store and
//! the credential store, plus user-friendly formatting for the CLI.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Profile directory or file could not be created, read or written
    #[error("io error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Interactive input could not be obtained
    #[error("prompt error: {0}")]
    Prompt(String),

    /// Profile file exists but its content is unusable
    #[error("invalid profile {}: {message}", path.display())]
    Profile {
        /// Profile path
        path: PathBuf,
        /// Detailed message
        message: String,
    },

    /// A secret backend could not be opened for a service
    #[error("failed to open backend for {service}: {message}")]
    BackendOpen {
        /// Service name
        service: String,
        /// Detailed message
        message: String,
    },

    /// A secret backend rejected a write
    #[error("failed to write {service}: {message}")]
    BackendWrite {
        /// Service name
        service: String,
        /// Detailed message
        message: String,
    },

    /// A secret backend failed while reading
    #[error("failed to read {service}: {message}")]
    BackendRead {
        /// Service name
        service: String,
        /// Detailed message
        message: String,
    },

    /// No entry for the requested key
    #[error("credential not found: {0}")]
    NotFound(String),

    /// Stored value is not in `<expire>  <secret>` form
    #[error("unable to decode credential: {0}")]
    Decode(String),

    /// Stored credential is past its expiry
    #[error("credential for {service} expired at {expired_at}")]
    Expired {
        /// Service name
        service: String,
        /// Unix timestamp the credential expired at
        expired_at: i64,
    },

    /// Cached version stamp is not `<semver>::<RFC3339>`
    #[error("unable to parse version from profile: {0}")]
    VersionStamp(String),

    /// `security` (or another platform tool) failed to run or exited non-zero
    #[error("{command} failed: {message}")]
    PlatformTool {
        /// Command line that was run
        command: String,
        /// Detailed message
        message: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an `Io` error for the given path
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether the credential accessors recover from this error by re-prompting
    ///
    /// Missing, expired, undecodable and unreadable entries are all replaced
    /// with a freshly prompted token.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Expired { .. } | Self::Decode(_) | Self::BackendRead { .. }
        )
    }
}

/// Trait for user-friendly error messages
///
/// Provides human-readable error messages and suggestions for fixing.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Io { path, source } => {
                format!("📁 Cannot access {}: {}", path.display(), source)
            }
            Error::Prompt(msg) => format!("⌨️ Could not read input: {}", msg),
            Error::Profile { path, message } => {
                format!("⚙️ Profile {} is invalid: {}", path.display(), message)
            }
            Error::BackendOpen { service, message } => {
                format!("🔐 Secret store for {} is unavailable: {}", service, message)
            }
            Error::BackendWrite { service, message } => {
                format!("🔐 Could not save {}: {}", service, message)
            }
            Error::BackendRead { service, message } => {
                format!("🔐 Could not read {}: {}", service, message)
            }
            Error::NotFound(key) => format!("🔑 No stored credential for {}.", key),
            Error::Decode(msg) => format!("🔑 Stored credential is corrupt: {}", msg),
            Error::Expired { service, .. } => format!("⏳ The {} token has expired.", service),
            Error::VersionStamp(msg) => format!("🏷️ Cached version is unreadable: {}", msg),
            Error::PlatformTool { command, message } => {
                format!("🛠️ `{}` failed: {}", command, message)
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Io { .. } => Some(
                "💡 Check that your home directory is writable (or set HALP_HOME).".to_string(),
            ),
            Error::Prompt(_) => {
                Some("💡 Run halp from an interactive terminal.".to_string())
            }
            Error::Profile { path, .. } => Some(format!(
                "💡 Fix or remove {} and run halp again.",
                path.display()
            )),
            Error::Decode(_) => {
                Some("💡 Run `halp delete all` and enter your tokens again.".to_string())
            }
            Error::PlatformTool { .. } => Some(
                "💡 Make sure the keychain exists and /usr/bin/security is usable.".to_string(),
            ),
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = error.user_message();

    if let Some(suggestion) = error.suggestion() {
        output.push_str("\n\n");
        output.push_str(&suggestion);
    }

    output
}
