//! Host platform and shell detection.
use std::fmt;
use std::path::PathBuf;

use crate::error::PlatformError;

/// Interactive shell dialect, used only to word the closing instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// zsh, the macOS default since Catalina.
    Zsh,
    /// bash, or any shell that is not zsh.
    Bash,
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zsh => write!(f, "zsh"),
            Self::Bash => write!(f, "bash"),
        }
    }
}

impl ShellKind {
    /// Detect the invoking shell.
    ///
    /// `ZSH_VERSION` / `BASH_VERSION` win when the parent shell exported
    /// them; otherwise the basename of `$SHELL` decides.  Anything that is
    /// not zsh is treated as bash.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_indicators(
            std::env::var_os("ZSH_VERSION").is_some(),
            std::env::var_os("BASH_VERSION").is_some(),
            std::env::var("SHELL").ok().as_deref(),
        )
    }

    /// Resolve the shell from explicit indicator values.
    #[must_use]
    pub fn from_indicators(zsh_version: bool, bash_version: bool, shell: Option<&str>) -> Self {
        if zsh_version {
            return Self::Zsh;
        }
        if bash_version {
            return Self::Bash;
        }
        match shell.and_then(|s| s.rsplit('/').next()) {
            Some("zsh") => Self::Zsh,
            _ => Self::Bash,
        }
    }

    /// Startup file this shell reads for interactive logins.
    #[must_use]
    pub fn profile_path(self, home: &std::path::Path) -> PathBuf {
        match self {
            Self::Zsh => home.join(".zshrc"),
            Self::Bash => home.join(".bash_profile"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Raw platform identifier (`OSTYPE` style, e.g. `darwin23`).
    pub id: String,
}

impl Platform {
    /// Detect the current platform.
    ///
    /// Uses `OSTYPE` when the parent shell exported it, otherwise the
    /// compile target's OS name.
    #[must_use]
    pub fn detect() -> Self {
        let id = std::env::var("OSTYPE")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| std::env::consts::OS.to_string());
        Self { id }
    }

    /// Create a platform with an explicit identifier.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }

    /// Whether this identifier belongs to the macOS (Darwin) family.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        let id = self.id.to_ascii_lowercase();
        id.starts_with("darwin") || id == "macos"
    }

    /// Abort unless running on macOS.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] for any other platform.
    pub fn guard(&self) -> Result<(), PlatformError> {
        if self.is_macos() {
            Ok(())
        } else {
            Err(PlatformError::Unsupported {
                platform: self.id.clone(),
            })
        }
    }
}
