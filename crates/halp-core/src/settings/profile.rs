//! The user's on-disk profile

use super::version::{VersionStamp, DEFAULT_STAMP};
use crate::error::{Error, Result};
use crate::APP_NAME;
use chrono::{DateTime, Utc};
use ini::{Ini, ParseOption};
use semver::Version;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub(crate) const NAME_KEY: &str = "name";
pub(crate) const JIRA_INSTANCE_KEY: &str = "jira_instance";
pub(crate) const JIRA_USERNAME_KEY: &str = "jira_username";
pub(crate) const FILE_PIN_KEY: &str = "file_pin";
const VERSION_KEY: &str = "version";
const VERSION_COMMENT: &str = "local cache of the halp version, really for the timestamp";

/// Comment lines attached to the key or section header that follows them
///
/// Names are stored lower-cased, matching the case-insensitive lookups.
#[derive(Debug, Clone, Default)]
struct Comments {
    keys: HashMap<(Option<String>, String), Vec<String>>,
    headers: HashMap<String, Vec<String>>,
    trailing: Vec<String>,
}

impl Comments {
    fn scan(content: &str) -> Self {
        let mut comments = Self::default();
        let mut pending = Vec::new();
        let mut section: Option<String> = None;

        for line in content.lines().map(str::trim) {
            if line.starts_with(';') || line.starts_with('#') {
                pending.push(line.to_string());
            } else if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim().to_lowercase();
                if !pending.is_empty() {
                    comments.headers.insert(name.clone(), std::mem::take(&mut pending));
                }
                section = Some(name);
            } else if let Some((key, _)) = line.split_once(|c| c == '=' || c == ':') {
                if !pending.is_empty() {
                    comments.keys.insert(
                        (section.clone(), key.trim().to_lowercase()),
                        std::mem::take(&mut pending),
                    );
                }
            }
        }

        comments.trailing = pending;
        comments
    }

    fn for_key(&self, section: Option<&str>, key: &str) -> Option<&Vec<String>> {
        self.keys
            .get(&(section.map(str::to_lowercase), key.to_lowercase()))
    }
}

/// User identity and preferences loaded from `settings.ini`
///
/// Fields mirror the unnamed base section of the file. The parsed INI is
/// kept so saving preserves comments and keys halp does not know about.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Display name; also the account credentials are stored under
    pub name: String,
    /// Jira instance (`<company_name>.atlassian.net`)
    pub jira_instance: String,
    /// Jira username (`<username>@example.com`)
    pub jira_username: String,
    /// PIN unlocking the encrypted file backend
    pub file_pin: Option<u32>,
    source: PathBuf,
    ini: Ini,
    comments: Comments,
}

impl Profile {
    /// Parse profile text; fields are filled in by the loader
    pub(crate) fn parse(source: PathBuf, content: &str) -> Result<Self> {
        let options = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options).map_err(|e| Error::Profile {
            path: source.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name: String::new(),
            jira_instance: String::new(),
            jira_username: String::new(),
            file_pin: None,
            source,
            ini,
            comments: Comments::scan(content),
        })
    }

    /// Path the profile was loaded from
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Account name credentials are stored under
    #[must_use]
    pub fn user(&self) -> &str {
        &self.name
    }

    /// Rendered profile text
    ///
    /// The base section always comes first so its keys never end up under a
    /// named section when the file is read back.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(base) = self.ini.section(None::<String>) {
            for (key, value) in base.iter() {
                self.render_entry(&mut out, None, key, value);
            }
        }

        for (section, properties) in self.ini.iter() {
            let Some(name) = section else { continue };
            if !out.is_empty() {
                out.push('\n');
            }
            if let Some(lines) = self.comments.headers.get(&name.to_lowercase()) {
                push_lines(&mut out, lines);
            }
            out.push_str(&format!("[{}]\n", name));
            for (key, value) in properties.iter() {
                self.render_entry(&mut out, Some(name), key, value);
            }
        }

        push_lines(&mut out, &self.comments.trailing);
        out
    }

    fn render_entry(&self, out: &mut String, section: Option<&str>, key: &str, value: &str) {
        if let Some(lines) = self.comments.for_key(section, key) {
            push_lines(out, lines);
        }
        out.push_str(&format!("{} = {}\n", key, value));
    }

    /// Write the profile back to its source path
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.source, self.render()).map_err(|e| Error::io(&self.source, e))?;
        debug!(path = %self.source.display(), "Saved profile");
        Ok(())
    }

    /// Read a base-section value, matching the key case-insensitively
    pub(crate) fn base_value(&self, key: &str) -> Option<String> {
        self.value(None, key)
    }

    /// Add or replace a base-section value; new keys get an explanatory comment
    pub(crate) fn insert_base_value(&mut self, key: &str, value: &str, comment: &str) {
        self.set_value(None, key, value, comment);
    }

    /// Read the stored PIN, if any
    pub(crate) fn stored_pin(&self) -> Result<Option<u32>> {
        let Some(text) = self.base_value(FILE_PIN_KEY).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        text.parse::<u32>().map(Some).map_err(|_| Error::Profile {
            path: self.source.clone(),
            message: format!("{} is not a number: {:?}", FILE_PIN_KEY, text),
        })
    }

    /// Cached version stamp, adding the tool section default if missing
    pub fn version_stamp(&mut self) -> Result<VersionStamp> {
        match self.value(Some(APP_NAME), VERSION_KEY) {
            Some(raw) => VersionStamp::parse(&raw),
            None => {
                self.set_value(Some(APP_NAME), VERSION_KEY, DEFAULT_STAMP, VERSION_COMMENT);
                VersionStamp::parse(DEFAULT_STAMP)
            }
        }
    }

    /// Record the running version in the tool section and save
    pub fn record_version(&mut self, version: &Version, now: DateTime<Utc>) -> Result<()> {
        let stamp = VersionStamp::new(version.clone(), now).to_string();
        self.set_value(Some(APP_NAME), VERSION_KEY, &stamp, VERSION_COMMENT);
        self.save()
    }

    /// Existing spelling of a section name, matched case-insensitively
    fn section_name(&self, section: Option<&str>) -> Option<String> {
        let wanted = section?;
        let found = self
            .ini
            .sections()
            .flatten()
            .find(|name| name.eq_ignore_ascii_case(wanted))
            .unwrap_or(wanted);
        Some(found.to_string())
    }

    fn value(&self, section: Option<&str>, key: &str) -> Option<String> {
        let section = self.section_name(section);
        self.ini
            .section(section.as_deref())
            .and_then(|props| {
                props
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v.trim().to_string())
            })
    }

    fn set_value(&mut self, section: Option<&str>, key: &str, value: &str, comment: &str) {
        let section = self.section_name(section);
        let existing = self.ini.section(section.as_deref()).and_then(|props| {
            props
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(k, _)| k.to_string())
        });

        let key = match existing {
            Some(key) => key,
            None => {
                self.comments.keys.insert(
                    (section.as_deref().map(str::to_lowercase), key.to_lowercase()),
                    vec![format!("; {}", comment)],
                );
                key.to_string()
            }
        };

        self.ini.with_section(section).set(key, value);
    }
}

fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
}
