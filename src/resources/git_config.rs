//! Global git configuration entries.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::{EnvVars, Executor};

/// Read a global git config value.
///
/// An unset key, or any failure of `git` itself, reads as an empty string.
///
/// # Errors
///
/// Returns an error only if `git` cannot be started.
pub fn read_global(executor: &dyn Executor, env: &EnvVars, key: &str) -> Result<String> {
    let result = executor.run_unchecked("git", &["config", "--global", "--get", key], env)?;
    if result.success {
        Ok(result.stdout.trim().to_string())
    } else {
        Ok(String::new())
    }
}

/// A global git config entry resource that can be checked and applied.
#[derive(Debug)]
pub struct GitConfigResource<'a> {
    /// Config key (e.g., "init.defaultBranch").
    pub key: String,
    /// Desired value (e.g., "main").
    pub desired_value: String,
    executor: &'a dyn Executor,
    env: &'a EnvVars,
}

impl<'a> GitConfigResource<'a> {
    /// Create a new git config resource.
    #[must_use]
    pub fn new(key: &str, desired_value: &str, executor: &'a dyn Executor, env: &'a EnvVars) -> Self {
        Self {
            key: key.to_string(),
            desired_value: desired_value.to_string(),
            executor,
            env,
        }
    }
}

impl Resource for GitConfigResource<'_> {
    fn description(&self) -> String {
        format!("{} = {}", self.key, self.desired_value)
    }

    fn current_state(&self) -> Result<ResourceState> {
        let current = read_global(self.executor, self.env, &self.key)?;
        if current.is_empty() {
            Ok(ResourceState::Missing)
        } else if current == self.desired_value {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect { current })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor.run(
            "git",
            &["config", "--global", &self.key, &self.desired_value],
            self.env,
        )?;
        Ok(ResourceChange::Applied)
    }
}
