// src/system/executor.rs

use crate::models::Command;
use std::fmt;
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, #[source] std::io::Error),
}

/// How a finished process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// The process exited with this code.
    Code(i32),
    /// The process was terminated without an exit code (e.g. by a signal).
    Signal,
}

impl ExitState {
    pub fn success(self) -> bool {
        self == Self::Code(0)
    }

    /// The code to hand on as the process exit status, if there is a meaningful one.
    pub fn failure_code(self) -> Option<i32> {
        match self {
            Self::Code(code) if code != 0 => Some(code),
            _ => None,
        }
    }
}

impl From<ExitStatus> for ExitState {
    fn from(status: ExitStatus) -> Self {
        status.code().map_or(Self::Signal, Self::Code)
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "returncode {}", code),
            Self::Signal => f.write_str("no returncode (terminated by signal)"),
        }
    }
}

/// The outcome of one finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExitState,
    /// Standard output, present only when capturing was requested.
    pub output: Option<String>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Runs a single command to completion.
///
/// A non-zero exit status is *not* an error at this level: it is reported in
/// the [`ExecutionResult`] and the caller decides how severe it is.
pub trait CommandExecutor {
    /// Executes `command` and waits for it. Streams are inherited from the
    /// current process; with `capture` the standard output is collected instead.
    fn execute(&self, command: &Command, capture: bool) -> Result<ExecutionResult, ExecutionError>;
}

/// Spawns real operating-system processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&self, command: &Command, capture: bool) -> Result<ExecutionResult, ExecutionError> {
        let mut process = build_process(command)?;
        process.stdin(Stdio::inherit()).stderr(Stdio::inherit());
        log::info!("Spawning '{}' (capture: {})", command, capture);

        if capture {
            let output = process
                .stdout(Stdio::piped())
                .output()
                .map_err(|e| ExecutionError::CommandFailed(command.to_string(), e))?;
            // The command has run; undecodable bytes must not turn it into a failure.
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let status = ExitState::from(output.status);
            log::debug!("'{}' finished with {}", command, status);
            Ok(ExecutionResult {
                status,
                output: Some(stdout),
            })
        } else {
            let status = process
                .stdout(Stdio::inherit())
                .status()
                .map_err(|e| ExecutionError::CommandFailed(command.to_string(), e))?;
            let status = ExitState::from(status);
            log::debug!("'{}' finished with {}", command, status);
            Ok(ExecutionResult {
                status,
                output: None,
            })
        }
    }
}

/// Builds the process for a command: argument lists are spawned directly,
/// strings go through the platform shell.
fn build_process(command: &Command) -> Result<StdCommand, ExecutionError> {
    match command {
        Command::Argv(tokens) => {
            let (program, args) = tokens.split_first().ok_or(ExecutionError::EmptyCommand)?;
            if program.trim().is_empty() {
                return Err(ExecutionError::EmptyCommand);
            }
            let mut process = StdCommand::new(program);
            process.args(args);
            Ok(process)
        }
        Command::Shell(line) => {
            if line.trim().is_empty() {
                return Err(ExecutionError::EmptyCommand);
            }
            let (shell, flag) = shell_invocation();
            let mut process = StdCommand::new(shell);
            process.arg(flag).arg(line);
            Ok(process)
        }
    }
}

fn shell_invocation() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}
