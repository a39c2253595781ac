//! External process invocation.
//!
//! Every side effect on the machine goes through the [`Executor`] trait so
//! that tasks can be exercised with a fake in tests.  Checked invocations
//! (`run`, `run_attached`) return a [`CommandFailed`] error on non-zero exit,
//! which is what gives the whole run its fail-fast behaviour; guarded
//! invocations use `run_unchecked` and inspect [`ExecResult::success`].
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::process::{Command, Output, Stdio};

use crate::error::CommandFailed;

/// Exit status of an attached command whose program is not on PATH.
pub const COMMAND_NOT_FOUND: i32 = 127;

/// Extra environment variables for a child process, applied on top of the
/// inherited environment.
pub type EnvVars = [(String, String)];

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit status, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl ExecResult {
    /// Convert a non-zero exit into a [`CommandFailed`] error.
    ///
    /// # Errors
    ///
    /// Returns [`CommandFailed`] when `success` is false.
    pub fn check(self, label: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(CommandFailed {
                label: label.to_string(),
                code: self.code,
                stderr: self.stderr.trim().to_string(),
            }
            .into())
        }
    }
}

/// Abstraction over process execution.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command with captured output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started, or a
    /// [`CommandFailed`] if it exits non-zero.
    fn run(&self, program: &str, args: &[&str], env: &EnvVars) -> Result<ExecResult> {
        self.run_unchecked(program, args, env)?.check(program)
    }

    /// Run a command with captured output, allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be started.
    fn run_unchecked(&self, program: &str, args: &[&str], env: &EnvVars) -> Result<ExecResult>;

    /// Run a command attached to the terminal (inherited stdio).
    ///
    /// Used for installers that print progress or ask for a password.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started, or a
    /// [`CommandFailed`] if it exits non-zero.
    fn run_attached(&self, program: &str, args: &[&str], env: &EnvVars) -> Result<()>;

    /// Check if a program is available on the given search path.
    fn which(&self, program: &str, search_path: &OsStr) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn command(program: &str, args: &[&str], env: &EnvVars) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (k, v) in env {
            cmd.env(k, v);
        }
        cmd
    }
}

impl Executor for SystemExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str], env: &EnvVars) -> Result<ExecResult> {
        let output = Self::command(program, args, env)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_attached(&self, program: &str, args: &[&str], env: &EnvVars) -> Result<()> {
        let (code, stderr) = match Self::command(program, args, env).status() {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => (status.code(), String::new()),
            // Report an unknown program the way a shell does.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (
                Some(COMMAND_NOT_FOUND),
                format!("{program}: command not found"),
            ),
            Err(e) => return Err(e).with_context(|| format!("failed to execute: {program}")),
        };
        Err(CommandFailed {
            label: program.to_string(),
            code,
            stderr,
        }
        .into())
    }

    fn which(&self, program: &str, search_path: &OsStr) -> bool {
        let cwd = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("/"));
        which::which_in(program, Some(search_path), cwd).is_ok()
    }
}
