//! Settings store
//!
//! The profile lives at `<home>/.config/gokeys/settings.ini`. Missing values
//! are collected interactively the first time they are needed and written
//! back with a comment describing each one.

mod profile;
mod version;

pub use profile::Profile;
pub use version::{VersionStamp, CHECK_INTERVAL_HOURS, DEFAULT_STAMP};

use crate::error::{Error, Result};
use crate::keyring::{pin_required, BackendKind};
use crate::prompt::{prompt_pin, prompt_text, Prompter};
use profile::{FILE_PIN_KEY, JIRA_INSTANCE_KEY, JIRA_USERNAME_KEY, NAME_KEY};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Profile directory, relative to the home directory
pub const CONFIG_DIR: [&str; 2] = [".config", "gokeys"];
/// Profile file name
pub const FILE_NAME: &str = "settings.ini";

/// Full path of the profile under `home`
#[must_use]
pub fn profile_path(home: &Path) -> PathBuf {
    CONFIG_DIR
        .iter()
        .fold(home.to_path_buf(), |path, part| path.join(part))
        .join(FILE_NAME)
}

/// Make sure the profile directory and file exist; existing content is kept
pub fn ensure_layout(home: &Path) -> Result<PathBuf> {
    let path = profile_path(home);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| Error::io(&path, e))?;

    Ok(path)
}

/// Load the profile, prompting for any value that is missing
///
/// Prompts happen in a fixed order: name, Jira instance, Jira username and,
/// only when none of `backends` authenticates the user, the file PIN. The
/// profile is saved before returning.
pub fn load(home: &Path, backends: &[BackendKind], prompter: &mut dyn Prompter) -> Result<Profile> {
    let path = ensure_layout(home)?;
    let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let mut profile = Profile::parse(path, &content)?;
    let mut changed = false;

    profile.name = text_value(
        &mut profile,
        prompter,
        NAME_KEY,
        "Please enter your name",
        "Full name",
        &mut changed,
    )?;
    profile.jira_instance = text_value(
        &mut profile,
        prompter,
        JIRA_INSTANCE_KEY,
        "Enter the jira instance name (<company_name>.atlassian.net)",
        "Jira Instance Name",
        &mut changed,
    )?;
    profile.jira_username = text_value(
        &mut profile,
        prompter,
        JIRA_USERNAME_KEY,
        "Enter the jira username (<username>@example.com)",
        "Jira User Name",
        &mut changed,
    )?;

    profile.file_pin = match profile.stored_pin()? {
        Some(pin) => Some(pin),
        None if pin_required(backends) => {
            let pin = prompt_pin(prompter, "Please enter a keychain 6 digit pin")?;
            profile.insert_base_value(
                FILE_PIN_KEY,
                &pin.to_string(),
                "pin used to unlock file-based keyrings",
            );
            changed = true;
            Some(pin)
        }
        None => None,
    };

    profile.save()?;
    if changed {
        info!(path = %profile.source().display(), "Profile updated");
    } else {
        debug!(path = %profile.source().display(), "Profile loaded");
    }

    Ok(profile)
}

fn text_value(
    profile: &mut Profile,
    prompter: &mut dyn Prompter,
    key: &str,
    message: &str,
    comment: &str,
    changed: &mut bool,
) -> Result<String> {
    if let Some(value) = profile.base_value(key).filter(|v| !v.is_empty()) {
        return Ok(value);
    }

    let value = prompt_text(prompter, message)?;
    profile.insert_base_value(key, value.as_str(), comment);
    *changed = true;
    Ok(value)
}
