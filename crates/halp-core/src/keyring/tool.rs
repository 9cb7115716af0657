//! External platform tool invocation

use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Captured result of a finished tool run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit status was zero
    pub success: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl ToolOutput {
    /// stdout followed by stderr
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }

    /// Short description of a failed run
    #[must_use]
    pub fn failure_message(&self) -> String {
        let detail = self.stderr.trim();
        match (self.code, detail.is_empty()) {
            (Some(code), true) => format!("exit status {}", code),
            (Some(code), false) => format!("exit status {}: {}", code, detail),
            (None, true) => "terminated by signal".to_string(),
            (None, false) => format!("terminated by signal: {}", detail),
        }
    }
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs an external program to completion
pub trait ToolRunner: Send + Sync {
    /// Run `program` with `args`, blocking until it exits
    ///
    /// # Errors
    /// Returns the spawn error if the program cannot be started
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<ToolOutput>;

    /// Run `program` with `args`, writing `input` to its stdin
    ///
    /// Used for values that must not appear in the process list.
    ///
    /// # Errors
    /// Returns the spawn error, or the error writing to stdin
    fn run_with_input(&self, program: &str, args: &[&str], input: &str)
        -> std::io::Result<ToolOutput>;
}

/// Runs tools as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<ToolOutput> {
        Ok(Command::new(program).args(args).output()?.into())
    }

    fn run_with_input(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> std::io::Result<ToolOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // stdin is closed when the handle drops, ending the tool's input
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes())?;
        }

        Ok(child.wait_with_output()?.into())
    }
}

/// Render a command line for error messages
pub(crate) fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
