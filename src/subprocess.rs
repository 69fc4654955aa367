//! Shell command execution with timeout support.
//!
//! The status command is user-configured and can block indefinitely; runs
//! happen on a worker thread with the caller waiting on a channel, so a hung
//! command costs one abandoned thread instead of a frozen refresh cycle.

use std::process::{Command, Output};
use std::time::Duration;

use crate::debug::{self, Level};

/// Result of a shell command execution with timeout.
#[derive(Debug)]
pub enum CommandResult {
    /// Command completed with exit status zero.
    Success(Output),
    /// Command ran past the timeout and was abandoned.
    Timeout,
    /// Command failed to spawn.
    SpawnError,
    /// Command exited with non-zero status.
    Failed(Output),
}

impl CommandResult {
    /// Returns stdout as a string if the command produced any.
    ///
    /// Non-zero exits still yield their stdout: a status script that prints
    /// markup and then exits 1 should still render.
    #[must_use]
    pub fn stdout_string(&self) -> Option<String> {
        match self {
            Self::Success(output) | Self::Failed(output) => {
                Some(String::from_utf8_lossy(&output.stdout).to_string())
            }
            _ => None,
        }
    }

    /// Returns true if the command completed with status zero.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true if the command timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Runs a command line through `sh -c` with a timeout.
///
/// A worker thread performs the blocking `output()` call, which drains the
/// pipes properly; the caller waits on a channel with the timeout. On
/// timeout the worker is left to finish on its own.
#[must_use]
pub fn run_shell_with_timeout(command: &str, timeout: Duration) -> CommandResult {
    use std::sync::mpsc;
    use std::thread;

    let command = command.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = Command::new("sh").arg("-c").arg(&command).output();
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(output)) => {
            if output.status.success() {
                CommandResult::Success(output)
            } else {
                CommandResult::Failed(output)
            }
        }
        Ok(Err(_)) => CommandResult::SpawnError,
        Err(mpsc::RecvTimeoutError::Timeout) => CommandResult::Timeout,
        Err(mpsc::RecvTimeoutError::Disconnected) => CommandResult::SpawnError,
    }
}

/// Runs the status command and returns its markup, empty on any failure.
///
/// Timeouts and spawn failures degrade to an empty strip rather than an
/// error; the next cycle retries.
#[must_use]
pub fn capture_markup(command: &str, timeout: Duration) -> String {
    match run_shell_with_timeout(command, timeout) {
        result @ (CommandResult::Success(_) | CommandResult::Failed(_)) => {
            result.stdout_string().unwrap_or_default()
        }
        CommandResult::Timeout => {
            debug::log(
                Level::Warn,
                "subprocess",
                &format!("command timed out after {timeout:?}: {command}"),
            );
            String::new()
        }
        CommandResult::SpawnError => {
            debug::log(Level::Error, "subprocess", &format!("failed to run: {command}"));
            String::new()
        }
    }
}
