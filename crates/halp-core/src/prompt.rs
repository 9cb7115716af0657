//! Interactive prompts
//!
//! `Prompter` is the seam between the stores and the terminal. The
//! validated loops (`prompt_text`, `prompt_pin`, `prompt_secret`) retry until
//! they get a usable value; the only other exit is an input-channel failure.

use crate::error::{Error, Result};
use crate::keyring::VALUE_SEPARATOR;
use inquire::{InquireError, Password, Text};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// Source of interactive input
pub trait Prompter {
    /// Ask for a visible line of text
    ///
    /// # Errors
    /// Returns `Error::Prompt` if input cannot be obtained
    fn ask(&mut self, message: &str) -> Result<String>;

    /// Ask for a masked secret
    ///
    /// # Errors
    /// Returns `Error::Prompt` if input cannot be obtained
    fn ask_secret(&mut self, message: &str) -> Result<String>;
}

/// Prompts on the controlling terminal, degrading to plain stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

/// Read a line from stdin; end of input is an error
fn read_line() -> Result<String> {
    let mut input = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(|e| Error::Prompt(format!("Failed to read input: {}", e)))?;
    if read == 0 {
        return Err(Error::Prompt("input closed".to_string()));
    }
    Ok(input)
}

fn fallback(message: &str) -> Result<String> {
    print!("{}: ", message);
    io::stdout()
        .flush()
        .map_err(|e| Error::Prompt(format!("Failed to write prompt: {}", e)))?;
    read_line()
}

fn cancelled(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, message: &str) -> Result<String> {
        match Text::new(message).prompt() {
            Ok(v) => Ok(v),
            Err(e) if cancelled(&e) => Err(Error::Prompt("Cancelled".to_string())),
            Err(e) => {
                debug!(error = %e, "inquire unavailable, reading stdin");
                fallback(message)
            }
        }
    }

    fn ask_secret(&mut self, message: &str) -> Result<String> {
        match Password::new(message)
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
        {
            Ok(v) => Ok(v),
            Err(e) if cancelled(&e) => Err(Error::Prompt("Cancelled".to_string())),
            Err(e) => {
                debug!(error = %e, "inquire unavailable, reading stdin");
                fallback(message)
            }
        }
    }
}

/// Prompt until a non-empty value is given; the result is trimmed and lower-cased
pub fn prompt_text(prompter: &mut dyn Prompter, message: &str) -> Result<String> {
    loop {
        let response = prompter.ask(message)?.trim().to_lowercase();
        if !response.is_empty() {
            return Ok(response);
        }
    }
}

/// Prompt until exactly 6 characters that parse as a number are given
pub fn prompt_pin(prompter: &mut dyn Prompter, message: &str) -> Result<u32> {
    loop {
        let response = prompter.ask(message)?.trim().to_lowercase();
        if response.chars().count() != 6 {
            continue;
        }
        if let Ok(pin) = response.parse::<u32>() {
            return Ok(pin);
        }
    }
}

/// Prompt (masked) until a storable secret is given; the secret is trimmed only
///
/// Secrets containing the stored value separator are rejected, since they
/// could not be decoded again.
pub fn prompt_secret(prompter: &mut dyn Prompter, message: &str) -> Result<String> {
    loop {
        let response = prompter.ask_secret(message)?;
        let response = response.trim();
        if response.is_empty() {
            continue;
        }
        if response.contains(VALUE_SEPARATOR) {
            warn!("Token contains two consecutive spaces, please enter it again");
            continue;
        }
        return Ok(response.to_string());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Replays scripted answers; running out of answers is a prompt error
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        /// Every message asked, in order
        pub asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: answers.into_iter().map(Into::into).collect(),
                asked: Vec::new(),
            }
        }

        fn next(&mut self, message: &str) -> Result<String> {
            self.asked.push(message.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| Error::Prompt("no terminal".to_string()))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, message: &str) -> Result<String> {
            self.next(message)
        }

        fn ask_secret(&mut self, message: &str) -> Result<String> {
            self.next(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedPrompter;
    use super::*;

    #[test]
    fn test_prompt_text_retries_until_non_empty() {
        let mut prompter = ScriptedPrompter::new(["", "   ", "  Josh Smith  "]);
        let value = prompt_text(&mut prompter, "Please enter your name").unwrap();

        assert_eq!(value, "josh smith");
        assert_eq!(prompter.asked.len(), 3);
    }

    #[test]
    fn test_prompt_pin_requires_six_digits() {
        let mut prompter = ScriptedPrompter::new(["123", "abcdef", "1234567", "012345"]);
        let pin = prompt_pin(&mut prompter, "pin").unwrap();

        assert_eq!(pin, 12345);
        assert_eq!(prompter.asked.len(), 4);
    }

    #[test]
    fn test_prompt_pin_rejects_negative() {
        let mut prompter = ScriptedPrompter::new(["-12345", "654321"]);
        assert_eq!(prompt_pin(&mut prompter, "pin").unwrap(), 654_321);
    }

    #[test]
    fn test_prompt_secret_keeps_case() {
        let mut prompter = ScriptedPrompter::new(["", " AbC-123 "]);
        assert_eq!(prompt_secret(&mut prompter, "token").unwrap(), "AbC-123");
    }

    #[test]
    fn test_prompt_secret_rejects_separator() {
        let mut prompter = ScriptedPrompter::new(["abc  def", "abc def"]);
        assert_eq!(prompt_secret(&mut prompter, "token").unwrap(), "abc def");
        assert_eq!(prompter.asked.len(), 2);
    }

    #[test]
    fn test_channel_failure_ends_loop() {
        let mut prompter = ScriptedPrompter::new(["", ""]);
        let err = prompt_text(&mut prompter, "name").unwrap_err();
        assert!(matches!(err, Error::Prompt(_)));

        let mut prompter = ScriptedPrompter::new(["12"]);
        assert!(matches!(
            prompt_pin(&mut prompter, "pin"),
            Err(Error::Prompt(_))
        ));
    }
}
