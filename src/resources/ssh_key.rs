//! ed25519 key pair generation and ssh-agent output parsing.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::{EnvVars, Executor};

/// An SSH key pair that is generated once and never overwritten.
#[derive(Debug)]
pub struct SshKeyResource<'a> {
    /// Private key path; the public key is `<path>.pub`.
    pub path: PathBuf,
    /// Key comment (usually an email address).
    pub comment: String,
    executor: &'a dyn Executor,
    env: &'a EnvVars,
}

impl<'a> SshKeyResource<'a> {
    /// Create a new key resource.
    #[must_use]
    pub fn new(path: PathBuf, comment: &str, executor: &'a dyn Executor, env: &'a EnvVars) -> Self {
        Self {
            path,
            comment: comment.to_string(),
            executor,
            env,
        }
    }

    /// Path of the public half.
    #[must_use]
    pub fn public_key_path(&self) -> PathBuf {
        public_key_path(&self.path)
    }
}

/// `<private>.pub`
#[must_use]
pub fn public_key_path(private: &Path) -> PathBuf {
    let mut name = private.as_os_str().to_os_string();
    name.push(".pub");
    PathBuf::from(name)
}

impl Resource for SshKeyResource<'_> {
    fn description(&self) -> String {
        format!("ed25519 key {}", self.path.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.path.exists() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.path.exists() {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        if let Some(dir) = self.path.parent() {
            create_private_dir(dir)?;
        }
        let path = self.path.to_string_lossy();
        self.executor.run(
            "ssh-keygen",
            &["-t", "ed25519", "-C", &self.comment, "-f", &path, "-N", ""],
            self.env,
        )?;
        Ok(ResourceChange::Applied)
    }
}

/// Create `dir` (and parents) readable only by the owner.
fn create_private_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
            .with_context(|| format!("chmod 700 {}", dir.display()))?;
    }
    Ok(())
}

/// Extract `SSH_AUTH_SOCK` and `SSH_AGENT_PID` from `ssh-agent -s` output.
///
/// The agent prints Bourne shell assignments such as
/// `SSH_AUTH_SOCK=/tmp/ssh-XXXX/agent.123; export SSH_AUTH_SOCK;`.
#[must_use]
pub fn parse_agent_env(output: &str) -> Vec<(String, String)> {
    output
        .split([';', '\n'])
        .filter_map(|stmt| stmt.trim().split_once('='))
        .filter(|(key, _)| matches!(*key, "SSH_AUTH_SOCK" | "SSH_AGENT_PID"))
        .map(|(key, value)| (key.to_string(), value.trim().to_string()))
        .collect()
}
