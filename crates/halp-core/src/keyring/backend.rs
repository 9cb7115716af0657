//! Backend selection
//!
//! Decides which secret backends the host exposes and whether the user has
//! to supply a PIN for the encrypted file fallback.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported secret backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// macOS Keychain
    Keychain,
    /// Windows Credential Manager
    WinCred,
    /// Linux Secret Service (D-Bus)
    SecretService,
    /// Encrypted file fallback
    File,
    /// In-memory only (for testing)
    Memory,
}

impl BackendKind {
    /// Backends in preference order (first = highest priority)
    pub const PREFERENCE: [Self; 4] = [
        Self::Keychain,
        Self::WinCred,
        Self::SecretService,
        Self::File,
    ];

    /// Whether the backend authenticates the user on its own
    #[must_use]
    pub fn authenticates_user(self) -> bool {
        matches!(self, Self::Keychain | Self::WinCred | Self::SecretService)
    }

    /// Human-readable backend name
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Keychain => "macOS Keychain",
            Self::WinCred => "Windows Credential Manager",
            Self::SecretService => "Secret Service",
            Self::File => "Encrypted file",
            Self::Memory => "In-memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Operating system family, as far as secret storage cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    /// macOS
    MacOs,
    /// Windows
    Windows,
    /// Linux
    Linux,
    /// FreeBSD
    FreeBsd,
    /// Anything else
    Other,
}

impl OsFamily {
    /// Family of the running binary
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            "freebsd" => Self::FreeBsd,
            _ => Self::Other,
        }
    }

    /// Linux and FreeBSD, whose backends do not namespace entries per service
    #[must_use]
    pub fn is_posix_family(self) -> bool {
        matches!(self, Self::Linux | Self::FreeBsd)
    }
}

/// Detected host capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPlatform {
    /// Operating system family
    pub os: OsFamily,
    /// A D-Bus session bus is reachable
    pub dbus_session: bool,
    /// Built with the `native-keyring` feature
    pub native_keyring: bool,
}

impl HostPlatform {
    /// Detect the running host
    #[must_use]
    pub fn detect() -> Self {
        let dbus_session = std::env::var("DBUS_SESSION_BUS_ADDRESS")
            .map(|addr| !addr.trim().is_empty())
            .unwrap_or(false);

        Self {
            os: OsFamily::current(),
            dbus_session,
            native_keyring: cfg!(feature = "native-keyring"),
        }
    }

    fn supports(&self, kind: BackendKind) -> bool {
        match kind {
            BackendKind::Keychain => self.os == OsFamily::MacOs,
            BackendKind::WinCred => self.os == OsFamily::Windows && self.native_keyring,
            BackendKind::SecretService => {
                self.os.is_posix_family() && self.native_keyring && self.dbus_session
            }
            BackendKind::File => true,
            BackendKind::Memory => false,
        }
    }
}

/// Backends the platform exposes, in preference order
#[must_use]
pub fn available_backends(platform: &HostPlatform) -> Vec<BackendKind> {
    BackendKind::PREFERENCE
        .into_iter()
        .filter(|kind| platform.supports(*kind))
        .collect()
}

/// Whether a 6-digit PIN must be collected for the file backend
#[must_use]
pub fn pin_required(backends: &[BackendKind]) -> bool {
    !backends.iter().any(|kind| kind.authenticates_user())
}
