//! Interactive macOS developer workstation setup.
//!
//! Walks a fresh Mac through a fixed sequence of stages: Homebrew, git
//! identity and an SSH key for GitHub, nvm and Node.js, shell profile
//! blocks, optional tooling, and a closing summary.  Every stage asks
//! before it changes anything and is safe to run again.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: built-in defaults plus an optional TOML settings file
//! - **[`resources`]**: idempotent `check + apply` primitives
//! - **[`tasks`]**: the named, ordered stages wired to resources
//! - **[`commands`]**: top-level orchestration (`setup`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod logging;
pub mod platform;
pub mod prompt;
pub mod resources;
pub mod session;
pub mod tasks;
