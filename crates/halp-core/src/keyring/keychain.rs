//! macOS Keychain backend
//!
//! Entries live in a dedicated keychain so halp never changes the settings
//! of the user's login keychain and nothing it stores syncs to iCloud.

use super::backend::BackendKind;
use super::secret_backend::{Item, SecretBackend};
use super::services::ServiceDescriptor;
use super::tool::{command_line, ToolOutput, ToolRunner};
use crate::error::{Error, Result};
use tracing::{debug, info};

/// Name of the dedicated halp keychain
pub const KEYCHAIN_NAME: &str = "Go Keyring Internal";

/// Path of the macOS keychain tool
pub const SECURITY_TOOL: &str = "/usr/bin/security";

/// Exit code `security` uses for a missing item
const ITEM_NOT_FOUND: i32 = 44;

/// Quote one argument for `security -i`, which splits its input on whitespace
fn quote_arg(arg: &str) -> String {
    let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Keychain file name for a keychain name
pub(crate) fn keychain_db(name: &str) -> String {
    format!("{}.keychain-db", name)
}

/// Keychain entries for one service, managed through `security`
pub struct KeychainBackend<R: ToolRunner> {
    service: ServiceDescriptor,
    keychain: String,
    runner: R,
}

impl<R: ToolRunner> KeychainBackend<R> {
    /// Create a backend bound to the dedicated halp keychain
    #[must_use]
    pub fn new(service: &ServiceDescriptor, runner: R) -> Self {
        Self {
            service: *service,
            keychain: keychain_db(KEYCHAIN_NAME),
            runner,
        }
    }

    fn security(&self, args: &[&str]) -> std::result::Result<ToolOutput, String> {
        self.runner.run(SECURITY_TOOL, args).map_err(|e| {
            format!(
                "failed to run {}: {}",
                command_line(SECURITY_TOOL, &args[..1]),
                e
            )
        })
    }

    fn is_not_found(output: &ToolOutput) -> bool {
        output.code == Some(ITEM_NOT_FOUND) || output.stderr.contains("could not be found")
    }

    /// Create the dedicated keychain if it does not exist yet
    fn ensure_keychain(&self) -> std::result::Result<(), String> {
        let info = self.security(&["show-keychain-info", &self.keychain])?;
        if info.success {
            return Ok(());
        }

        info!(keychain = %self.keychain, "Creating dedicated keychain");
        // -P asks for the new keychain password through the system dialog
        let created = self.security(&["create-keychain", "-P", &self.keychain])?;
        if !created.success && !created.stderr.contains("already exists") {
            return Err(format!("create-keychain {}", created.failure_message()));
        }
        Ok(())
    }
}

impl<R: ToolRunner> SecretBackend for KeychainBackend<R> {
    fn kind(&self) -> BackendKind {
        BackendKind::Keychain
    }

    fn get(&self, key: &str) -> Result<Option<Item>> {
        let read_error = |message: String| Error::BackendRead {
            service: self.service.name.to_string(),
            message,
        };

        let output = self
            .security(&[
                "find-generic-password",
                "-s",
                self.service.name,
                "-a",
                key,
                "-w", // Print password only
                &self.keychain,
            ])
            .map_err(read_error)?;

        if !output.success {
            if Self::is_not_found(&output) {
                debug!(service = %self.service.name, "No keychain entry");
                return Ok(None);
            }
            return Err(read_error(format!("Keychain error: {}", output.failure_message())));
        }

        let data = output.stdout.trim_end_matches(['\r', '\n']).to_string();
        Ok(Some(Item::new(key, data, &self.service)))
    }

    fn set(&self, item: Item) -> Result<()> {
        let write_error = |message: String| Error::BackendWrite {
            service: self.service.name.to_string(),
            message,
        };

        self.ensure_keychain().map_err(write_error)?;

        // The secret goes through stdin so it never shows up in the process list
        let args: [&str; 13] = [
            "add-generic-password",
            "-U", // Update if exists
            "-s",
            self.service.name,
            "-a",
            &item.key,
            "-l",
            &item.label,
            "-j",
            &item.description,
            "-w",
            &item.data,
            &self.keychain,
        ];
        let command = args
            .iter()
            .map(|arg| quote_arg(arg))
            .collect::<Vec<_>>()
            .join(" ");

        let output = self
            .runner
            .run_with_input(SECURITY_TOOL, &["-i"], &format!("{}\n", command))
            .map_err(|e| write_error(format!("failed to run {} -i: {}", SECURITY_TOOL, e)))?;

        // Interactive mode reports a failed command on stderr, not in the exit code
        if !output.success || !output.stderr.trim().is_empty() {
            return Err(write_error(format!("Keychain error: {}", output.failure_message())));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let output = self
            .security(&[
                "delete-generic-password",
                "-s",
                self.service.name,
                "-a",
                key,
                &self.keychain,
            ])
            .map_err(|message| Error::BackendWrite {
                service: self.service.name.to_string(),
                message,
            })?;

        if output.success {
            return Ok(true);
        }
        // Ignore "not found" errors
        if Self::is_not_found(&output) {
            return Ok(false);
        }
        Err(Error::BackendWrite {
            service: self.service.name.to_string(),
            message: format!("Keychain error: {}", output.failure_message()),
        })
    }
}
