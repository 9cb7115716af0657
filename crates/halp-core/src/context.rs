//! Process-wide context
//!
//! Built once at startup and passed explicitly into the settings and
//! credential stores.

use crate::error::{Error, Result};
use crate::keyring::HostPlatform;
use crate::APP_NAME;
use std::path::{Path, PathBuf};

/// Overrides the home directory the profile is stored under
pub const HOME_ENV: &str = "HALP_HOME";
/// Overrides the data directory used by the encrypted file backend
pub const DATA_DIR_ENV: &str = "HALP_DATA_DIR";
/// Skips the interactive parts of keychain unlock sequencing
pub const TEST_MODE_ENV: &str = "HALP_TEST_MODE";

/// Host environment for one halp run
#[derive(Debug, Clone)]
pub struct HalpContext {
    /// Root the `.config/gokeys` profile directory lives under
    pub home_dir: PathBuf,
    /// Root the encrypted file backend lives under
    pub data_dir: PathBuf,
    /// Detected platform capabilities
    pub platform: HostPlatform,
    /// Whether interactive unlock steps are skipped
    pub test_mode: bool,
}

impl HalpContext {
    /// Create a context from explicit parts
    #[must_use]
    pub fn new(
        home_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        platform: HostPlatform,
    ) -> Self {
        Self {
            home_dir: home_dir.into(),
            data_dir: data_dir.into(),
            platform,
            test_mode: false,
        }
    }

    /// Toggle test mode
    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Detect the context from the environment and the running platform
    pub fn detect() -> Result<Self> {
        let home_dir = std::env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .ok_or_else(|| Error::Profile {
                path: PathBuf::from("~"),
                message: "cannot determine home directory".to_string(),
            })?;

        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .or_else(dirs::data_dir)
            .unwrap_or_else(|| home_dir.join(".local").join("share"));

        let test_mode = std::env::var(TEST_MODE_ENV)
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self::new(home_dir, data_dir, HostPlatform::detect()).with_test_mode(test_mode))
    }

    /// Directory holding one encrypted file per service
    #[must_use]
    pub fn file_backend_dir(&self) -> PathBuf {
        self.data_dir.join(APP_NAME).join("keyrings")
    }

    /// Home directory the profile is resolved against
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home_dir
    }
}
