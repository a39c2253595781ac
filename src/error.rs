//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors where a caller needs to inspect them
//! (the platform guard, a failed external command) and [`anyhow::Error`]
//! everywhere else.  The binary walks the error chain with
//! [`exit_code_for`] to turn a failure back into a process exit status.
//!
//! # Error hierarchy
//!
//! ```text
//! PlatformError: host is not a supported macOS system
//! CommandFailed: an unguarded external command exited non-zero
//! ConfigError:   settings file could not be read or parsed
//! PromptError:   interactive input could not be read
//! ```

use thiserror::Error;

/// Errors raised by the environment guard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform identifier does not belong to the supported family.
    #[error("unsupported platform '{platform}': this setup only runs on macOS")]
    Unsupported {
        /// The platform identifier that was inspected (e.g. `"linux-gnu"`).
        platform: String,
    },
}

/// An external command ran to completion but reported failure.
///
/// Carries the child's exit status so the process can terminate with the
/// same code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{label} failed (exit {}): {stderr}", describe_code(.code))]
pub struct CommandFailed {
    /// Program name or short description of the invocation.
    pub label: String,
    /// Exit status, `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    /// Trimmed standard error (empty for attached commands).
    pub stderr: String,
}

#[allow(clippy::ref_option)]
fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Errors that arise from loading the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unexpected keys.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Path to the offending file.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Errors raised while reading interactive input.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Reading from the terminal failed.
    #[error("failed to read answer for '{prompt}': {source}")]
    Read {
        /// Prompt text that was being answered.
        prompt: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Map an error chain to the exit status the process should terminate with.
///
/// A failed external command propagates its own exit status; everything else
/// (including an unsupported platform) exits with `1`.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CommandFailed>())
        .and_then(|failed| failed.code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|&code| code != 0)
        .unwrap_or(1)
}
