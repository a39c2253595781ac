//! User-tunable settings.
//!
//! Every value has a built-in default, so running without a settings file is
//! the normal case.  A file at `$XDG_CONFIG_HOME/macsetup/config.toml` (or
//! the path given with `--config`) overrides individual keys:
//!
//! ```toml
//! [node]
//! default_version = "20"
//!
//! [tools]
//! cli = ["gh", "jq", "ripgrep"]
//!
//! [[aliases]]
//! name = "k"
//! command = "kubectl"
//! ```
pub mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Settings for the git identity stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitSettings {
    /// Value written to `init.defaultBranch`.
    pub default_branch: String,
    /// Value written to `pull.rebase`.
    pub pull_rebase: bool,
    /// Placeholder offered when no `user.name` exists yet.
    pub placeholder_name: String,
    /// Placeholder offered when no `user.email` exists yet.
    pub placeholder_email: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
            pull_rebase: false,
            placeholder_name: "John Doe".to_string(),
            placeholder_email: "you@example.com".to_string(),
        }
    }
}

/// Settings for nvm and Node.js.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeSettings {
    /// Version identifier offered at the version prompt.
    pub default_version: String,
    /// nvm release tag whose installer is fetched.
    pub nvm_version: String,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            default_version: "lts/*".to_string(),
            nvm_version: "v0.39.7".to_string(),
        }
    }
}

impl NodeSettings {
    /// URL of the pinned nvm install script.
    #[must_use]
    pub fn nvm_install_url(&self) -> String {
        format!(
            "https://raw.githubusercontent.com/nvm-sh/nvm/{}/install.sh",
            self.nvm_version
        )
    }
}

/// Packages offered by the optional tooling stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    /// Homebrew formulae.
    pub cli: Vec<String>,
    /// Global npm packages providing alternative package managers.
    pub package_managers: Vec<String>,
    /// Global npm packages providing a code formatter.
    pub formatters: Vec<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            cli: ["gh", "jq", "wget", "tree"].map(String::from).to_vec(),
            package_managers: ["yarn", "pnpm"].map(String::from).to_vec(),
            formatters: vec!["prettier".to_string()],
        }
    }
}

/// A shell alias written to the profile alias block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alias {
    /// Alias name (e.g. `gs`).
    pub name: String,
    /// Expansion (e.g. `git status`).
    pub command: String,
}

impl Alias {
    fn new(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
        }
    }
}

fn default_aliases() -> Vec<Alias> {
    vec![
        Alias::new("ll", "ls -lah"),
        Alias::new("gs", "git status"),
        Alias::new("ga", "git add"),
        Alias::new("gc", "git commit"),
        Alias::new("gp", "git push"),
        Alias::new("gl", "git log --oneline --graph --decorate"),
    ]
}

/// All settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Git identity stage settings.
    pub git: GitSettings,
    /// nvm / Node.js settings.
    pub node: NodeSettings,
    /// Optional tooling packages.
    pub tools: ToolSettings,
    /// Aliases written to each shell profile.
    pub aliases: Vec<Alias>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            git: GitSettings::default(),
            node: NodeSettings::default(),
            tools: ToolSettings::default(),
            aliases: default_aliases(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but is unreadable or
    /// malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }

    /// Default settings file location.
    ///
    /// `$XDG_CONFIG_HOME/macsetup/config.toml`, falling back to
    /// `~/.config/macsetup/config.toml`.
    #[must_use]
    pub fn default_path(home: &Path) -> PathBuf {
        std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map_or_else(|| home.join(".config"), PathBuf::from)
            .join("macsetup")
            .join("config.toml")
    }
}
