//! Integration tests for the settings store
//!
//! Profiles are written under a temporary home directory and answers come
//! from a scripted prompter.

use chrono::{TimeZone, Utc};
use halp_core::settings::{ensure_layout, load, profile_path, DEFAULT_STAMP};
use halp_core::{BackendKind, Error, Prompter, Result};
use semver::Version;
use std::collections::VecDeque;

#[derive(Default)]
struct Answers {
    queue: VecDeque<String>,
    asked: Vec<String>,
}

impl Answers {
    fn new(answers: &[&str]) -> Self {
        Self {
            queue: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for Answers {
    fn ask(&mut self, message: &str) -> Result<String> {
        self.asked.push(message.to_string());
        self.queue
            .pop_front()
            .ok_or_else(|| Error::Prompt("input closed".to_string()))
    }

    fn ask_secret(&mut self, message: &str) -> Result<String> {
        self.ask(message)
    }
}

const FULL_ANSWERS: [&str; 4] = ["Josh", "Acme.atlassian.net", "josh@acme.com", "123456"];

// ============================================================================
// First run
// ============================================================================

#[test]
fn test_fresh_profile_prompts_in_order() {
    let home = tempfile::tempdir().unwrap();
    let mut answers = Answers::new(&FULL_ANSWERS);

    let profile = load(home.path(), &[BackendKind::File], &mut answers).unwrap();

    assert_eq!(
        answers.asked,
        vec![
            "Please enter your name",
            "Enter the jira instance name (<company_name>.atlassian.net)",
            "Enter the jira username (<username>@example.com)",
            "Please enter a keychain 6 digit pin",
        ]
    );
    assert_eq!(profile.name, "josh");
    assert_eq!(profile.jira_instance, "acme.atlassian.net");
    assert_eq!(profile.jira_username, "josh@acme.com");
    assert_eq!(profile.file_pin, Some(123_456));
    assert_eq!(profile.source(), profile_path(home.path()));
}

#[test]
fn test_fresh_profile_is_persisted() {
    let home = tempfile::tempdir().unwrap();
    let mut answers = Answers::new(&FULL_ANSWERS);
    load(home.path(), &[BackendKind::File], &mut answers).unwrap();

    let mut silent = Answers::new(&[]);
    let profile = load(home.path(), &[BackendKind::File], &mut silent).unwrap();

    assert!(silent.asked.is_empty());
    assert_eq!(profile.name, "josh");
    assert_eq!(profile.file_pin, Some(123_456));
}

#[test]
fn test_comments_are_written() {
    let home = tempfile::tempdir().unwrap();
    let mut answers = Answers::new(&FULL_ANSWERS);
    load(home.path(), &[BackendKind::File], &mut answers).unwrap();

    let content = std::fs::read_to_string(profile_path(home.path())).unwrap();
    assert!(content.contains("; Full name\nname = josh\n"));
    assert!(content.contains("; Jira Instance Name\njira_instance = acme.atlassian.net\n"));
    assert!(content.contains("; Jira User Name\n"));
    assert!(content.contains("; pin used to unlock file-based keyrings\nfile_pin = 123456\n"));
}

#[test]
fn test_authenticating_backend_skips_pin() {
    let home = tempfile::tempdir().unwrap();
    let mut answers = Answers::new(&FULL_ANSWERS[..3]);

    let profile = load(
        home.path(),
        &[BackendKind::Keychain, BackendKind::File],
        &mut answers,
    )
    .unwrap();

    assert_eq!(answers.asked.len(), 3);
    assert_eq!(profile.file_pin, None);

    let content = std::fs::read_to_string(profile.source()).unwrap();
    assert!(!content.contains("file_pin"));
}

#[test]
fn test_existing_pin_is_read_without_pin_backend() {
    let home = tempfile::tempdir().unwrap();
    let path = ensure_layout(home.path()).unwrap();
    std::fs::write(
        &path,
        "name = josh\njira_instance = acme.atlassian.net\njira_username = josh@acme.com\nfile_pin = 654321\n",
    )
    .unwrap();

    let mut silent = Answers::new(&[]);
    let profile = load(home.path(), &[BackendKind::SecretService], &mut silent).unwrap();
    assert_eq!(profile.file_pin, Some(654_321));
}

#[test]
fn test_invalid_pin_is_reprompted() {
    let home = tempfile::tempdir().unwrap();
    let mut answers = Answers::new(&["josh", "acme", "josh@acme.com", "12", "abcdef", "000042"]);

    let profile = load(home.path(), &[BackendKind::File], &mut answers).unwrap();
    assert_eq!(profile.file_pin, Some(42));
    assert_eq!(answers.asked.len(), 6);
}

// ============================================================================
// Existing profiles
// ============================================================================

#[test]
fn test_ensure_layout_never_truncates() {
    let home = tempfile::tempdir().unwrap();
    let path = ensure_layout(home.path()).unwrap();
    assert!(path.ends_with(".config/gokeys/settings.ini"));

    std::fs::write(&path, "name = josh\n").unwrap();
    assert_eq!(ensure_layout(home.path()).unwrap(), path);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "name = josh\n");
}

#[test]
fn test_keys_are_case_insensitive() {
    let home = tempfile::tempdir().unwrap();
    let path = ensure_layout(home.path()).unwrap();
    std::fs::write(
        &path,
        "Name = josh\nJIRA_INSTANCE = acme.atlassian.net\nJira_Username = josh@acme.com\n",
    )
    .unwrap();

    let mut silent = Answers::new(&[]);
    let profile = load(home.path(), &[BackendKind::Keychain], &mut silent).unwrap();

    assert!(silent.asked.is_empty());
    assert_eq!(profile.jira_instance, "acme.atlassian.net");
}

#[test]
fn test_existing_ini_profile_loads_without_prompts() {
    let home = tempfile::tempdir().unwrap();
    let path = ensure_layout(home.path()).unwrap();
    std::fs::write(
        &path,
        "; Full name\n\
         name          = josh smith\n\
         ; Jira Instance Name\n\
         jira_instance = acme.atlassian.net\n\
         ; Jira User Name\n\
         jira_username = josh@acme.com\n\
         ; pin used to unlock file-based keyrings\n\
         file_pin      = 123456\n\
         \n\
         [halp]\n\
         ; local cache of the halp version, really for the timestamp\n\
         version = 1.2.0::2024-03-01T08:00:00Z\n",
    )
    .unwrap();

    let mut silent = Answers::new(&[]);
    let mut profile = load(home.path(), &[BackendKind::File], &mut silent).unwrap();

    assert!(silent.asked.is_empty());
    assert_eq!(profile.name, "josh smith");
    assert_eq!(profile.jira_instance, "acme.atlassian.net");
    assert_eq!(profile.jira_username, "josh@acme.com");
    assert_eq!(profile.file_pin, Some(123_456));

    let stamp = profile.version_stamp().unwrap();
    assert_eq!(stamp.version, Some(Version::new(1, 2, 0)));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("; Full name\nname = josh smith\n"));
    assert!(content.contains("\n[halp]\n; local cache of the halp version"));
}

#[test]
fn test_unknown_keys_survive_save() {
    let home = tempfile::tempdir().unwrap();
    let path = ensure_layout(home.path()).unwrap();
    std::fs::write(&path, "; my notes\nteam = platform\n").unwrap();

    let mut answers = Answers::new(&FULL_ANSWERS[..3]);
    load(home.path(), &[BackendKind::Keychain], &mut answers).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("; my notes\nteam = platform\n"));
    assert!(content.contains("name = josh\n"));
}

#[test]
fn test_unparseable_profile() {
    let home = tempfile::tempdir().unwrap();
    let path = ensure_layout(home.path()).unwrap();
    std::fs::write(&path, "[halp\nname = josh\n").unwrap();

    let mut silent = Answers::new(&[]);
    let err = load(home.path(), &[BackendKind::Keychain], &mut silent).unwrap_err();
    assert!(matches!(err, Error::Profile { .. }));
}

#[test]
fn test_prompt_failure_surfaces() {
    let home = tempfile::tempdir().unwrap();
    let mut answers = Answers::new(&["josh"]);

    let err = load(home.path(), &[BackendKind::File], &mut answers).unwrap_err();
    assert!(matches!(err, Error::Prompt(_)));
}

// ============================================================================
// Version stamp
// ============================================================================

#[test]
fn test_version_stamp_default_and_record() {
    let home = tempfile::tempdir().unwrap();
    let mut answers = Answers::new(&FULL_ANSWERS[..3]);
    let mut profile = load(home.path(), &[BackendKind::Keychain], &mut answers).unwrap();

    let stamp = profile.version_stamp().unwrap();
    assert_eq!(stamp.version, Some(Version::new(0, 0, 0)));
    assert!(stamp.is_stale(Utc::now()));

    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    profile.record_version(&Version::new(1, 4, 2), now).unwrap();

    let content = std::fs::read_to_string(profile.source()).unwrap();
    assert!(content.contains("[halp]"));
    assert!(content.contains("version = 1.4.2::2024-05-01T12:00:00Z\n"));
    assert!(!content.contains(DEFAULT_STAMP));

    let mut silent = Answers::new(&[]);
    let mut reloaded = load(home.path(), &[BackendKind::Keychain], &mut silent).unwrap();
    let stamp = reloaded.version_stamp().unwrap();
    assert_eq!(stamp.version, Some(Version::new(1, 4, 2)));
    assert_eq!(stamp.checked_at, Some(now));
    assert!(!stamp.is_stale(now));
}

#[test]
fn test_bad_version_stamp() {
    let home = tempfile::tempdir().unwrap();
    let path = ensure_layout(home.path()).unwrap();
    std::fs::write(
        &path,
        "name = josh\njira_instance = a\njira_username = b\n\n[halp]\nversion = 1.0.0\n",
    )
    .unwrap();

    let mut silent = Answers::new(&[]);
    let mut profile = load(home.path(), &[BackendKind::Keychain], &mut silent).unwrap();
    assert!(matches!(
        profile.version_stamp(),
        Err(Error::VersionStamp(_))
    ));
}
