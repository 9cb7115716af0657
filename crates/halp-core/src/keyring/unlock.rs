//! Platform unlock sequencing
//!
//! On macOS the dedicated keychain is created on first write and then
//! switched to `no-timeout` so it does not relock while halp is in use.
//! Other platforms need nothing.

use super::backend::OsFamily;
use super::keychain::{keychain_db, KEYCHAIN_NAME, SECURITY_TOOL};
use super::store::CredentialStore;
use super::tool::{command_line, SystemRunner, ToolOutput, ToolRunner};
use crate::context::HalpContext;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use tracing::{debug, info};

/// Marker `security show-keychain-info` prints for a keychain that never locks
const NO_TIMEOUT: &str = "no-timeout";

/// One-time platform preparation run after the credential store opens
pub trait UnlockSequencer {
    /// Make sure the secret backend is usable without further prompts
    ///
    /// # Errors
    /// Returns `Error::PlatformTool` if a platform tool fails
    fn ensure_unlocked(&self, store: &CredentialStore, prompter: &mut dyn Prompter) -> Result<()>;
}

/// Sequencer for platforms with nothing to unlock
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUnlock;

impl UnlockSequencer for NoUnlock {
    fn ensure_unlocked(&self, _store: &CredentialStore, _prompter: &mut dyn Prompter) -> Result<()> {
        Ok(())
    }
}

/// Keychain settings sequencer for macOS
#[derive(Debug)]
pub struct KeychainUnlock<R: ToolRunner = SystemRunner> {
    runner: R,
    keychain: String,
    test_mode: bool,
}

impl<R: ToolRunner> KeychainUnlock<R> {
    /// Create a sequencer for the dedicated halp keychain
    #[must_use]
    pub fn new(runner: R, test_mode: bool) -> Self {
        Self {
            runner,
            keychain: keychain_db(KEYCHAIN_NAME),
            test_mode,
        }
    }

    fn security(&self, args: &[&str]) -> Result<ToolOutput> {
        let command = command_line(SECURITY_TOOL, args);
        let output = self
            .runner
            .run(SECURITY_TOOL, args)
            .map_err(|e| Error::PlatformTool {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.success {
            return Err(Error::PlatformTool {
                command,
                message: output.failure_message(),
            });
        }
        Ok(output)
    }
}

impl<R: ToolRunner> UnlockSequencer for KeychainUnlock<R> {
    fn ensure_unlocked(&self, store: &CredentialStore, prompter: &mut dyn Prompter) -> Result<()> {
        // Reading a token first makes sure the keychain exists
        if !self.test_mode {
            store.tempo_credential(prompter)?;
        }

        let info = self.security(&["show-keychain-info", &self.keychain])?;
        if info.combined().contains(NO_TIMEOUT) {
            debug!(keychain = %self.keychain, "Keychain already has no timeout");
            return Ok(());
        }

        self.security(&["set-keychain-settings", &self.keychain])?;
        info!(keychain = %self.keychain, "Disabled keychain auto-lock");
        Ok(())
    }
}

/// Pick the sequencer for the running platform
#[must_use]
pub fn sequencer_for(ctx: &HalpContext) -> Box<dyn UnlockSequencer> {
    match ctx.platform.os {
        OsFamily::MacOs => Box::new(KeychainUnlock::new(SystemRunner, ctx.test_mode)),
        _ => Box::new(NoUnlock),
    }
}
