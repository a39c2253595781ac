//! Environment of the provisioning session.
//!
//! Stages communicate through the machine state they leave behind (is nvm
//! present, which `node` is on PATH).  Changes that a shell script would make
//! with `export` are recorded here instead, and every child process receives
//! them through [`SessionEnv::vars`].
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::platform::ShellKind;

/// Mutable view of the environment seen by child processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnv {
    /// User's home directory.
    pub home: PathBuf,
    /// Search path, highest priority first.
    pub path: Vec<PathBuf>,
    /// nvm installation directory (`$NVM_DIR`, default `~/.nvm`).
    pub nvm_dir: PathBuf,
    /// Whether nvm's activation script is available to this session.
    pub nvm_loaded: bool,
    /// `SSH_AUTH_SOCK` / `SSH_AGENT_PID` from a started agent.
    pub ssh_agent: Vec<(String, String)>,
    /// Git email resolved by the identity stage.
    pub git_email: Option<String>,
    /// Shell the user launched us from.
    pub shell: ShellKind,
}

impl SessionEnv {
    /// Build a session from explicit values.
    #[must_use]
    pub fn new(home: &Path, path: Vec<PathBuf>, nvm_dir: Option<PathBuf>, shell: ShellKind) -> Self {
        Self {
            home: home.to_path_buf(),
            path,
            nvm_dir: nvm_dir.unwrap_or_else(|| home.join(".nvm")),
            nvm_loaded: false,
            ssh_agent: Vec::new(),
            git_email: None,
            shell,
        }
    }

    /// Capture the session from the current process environment.
    #[must_use]
    pub fn from_process(home: &Path) -> Self {
        let path = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        let nvm_dir = std::env::var_os("NVM_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::new(home, path, nvm_dir, ShellKind::detect())
    }

    /// Put `dir` at the front of the search path, removing any later copy.
    pub fn prepend_path(&mut self, dir: &Path) {
        self.path.retain(|p| p != dir);
        self.path.insert(0, dir.to_path_buf());
    }

    /// Search path joined with the platform separator.
    ///
    /// Entries that cannot be represented in a joined PATH are dropped.
    #[must_use]
    pub fn search_path(&self) -> OsString {
        std::env::join_paths(
            self.path
                .iter()
                .filter(|p| std::env::join_paths(std::iter::once(p)).is_ok()),
        )
        .unwrap_or_default()
    }

    /// nvm's activation script.
    #[must_use]
    pub fn nvm_script(&self) -> PathBuf {
        self.nvm_dir.join("nvm.sh")
    }

    /// Whether nvm is installed (its activation script exists).
    #[must_use]
    pub fn nvm_installed(&self) -> bool {
        self.nvm_script().is_file()
    }

    /// Whether `NVM_DIR` is the conventional `~/.nvm`.
    #[must_use]
    pub fn nvm_dir_is_default(&self) -> bool {
        self.nvm_dir == self.home.join(".nvm")
    }

    /// Path of the ed25519 private key.
    #[must_use]
    pub fn ssh_key_path(&self) -> PathBuf {
        self.home.join(".ssh").join("id_ed25519")
    }

    /// Variables every child process receives on top of the inherited
    /// environment.
    #[must_use]
    pub fn vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            (
                "PATH".to_string(),
                self.search_path().to_string_lossy().into_owned(),
            ),
            (
                "NVM_DIR".to_string(),
                self.nvm_dir.to_string_lossy().into_owned(),
            ),
        ];
        vars.extend(self.ssh_agent.iter().cloned());
        vars
    }
}
