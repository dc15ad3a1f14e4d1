//! Command runner port
//!
//! Defines the interface for executing an external deploy command.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use super::super::models::DeployCommand;

/// Errors that prevent a command from producing an exit status
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started (not installed, not executable)
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The command ran past its deadline and was killed
    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    /// Waiting on the child process failed
    #[error("failed to wait for command: {0}")]
    Wait(#[source] std::io::Error),
}

/// Captured result of a command that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Exit code zero
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Executes deploy commands
///
/// Implementations block until the command exits or `timeout` elapses. A
/// timed-out command must be killed before returning [`CommandError::Timeout`].
pub trait CommandRunner {
    /// Run `command` in `work_dir`, capturing its output
    fn run(
        &self,
        command: &DeployCommand,
        work_dir: &Path,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}
