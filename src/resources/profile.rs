//! Marker-guarded blocks in append-only text files (shell profiles,
//! `~/.ssh/config`).
//!
//! A file is viewed as an ordered sequence of blank-line separated blocks.
//! A block is identified by a marker substring; [`ProfileDocument::ensure_block`]
//! appends a block only when no existing block carries its marker, so
//! applying the same block any number of times leaves the file exactly as
//! applying it once.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use super::{Resource, ResourceChange, ResourceState};

/// In-memory view of a profile file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDocument {
    text: String,
}

impl ProfileDocument {
    /// Wrap existing file contents.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    /// Blank-line separated blocks, in file order.
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.text
            .split("\n\n")
            .map(|b| b.trim_matches('\n'))
            .filter(|b| !b.trim().is_empty())
    }

    /// Whether any block carries `marker`.
    #[must_use]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.blocks().any(|b| b.contains(marker))
    }

    /// Text that [`ensure_block`](Self::ensure_block) would append, or `None`
    /// when the marker is already present.
    #[must_use]
    pub fn pending_append(&self, marker: &str, block: &str) -> Option<String> {
        if self.has_marker(marker) {
            return None;
        }
        let mut appended = String::with_capacity(block.len() + 2);
        appended.push('\n');
        appended.push_str(block);
        if !block.ends_with('\n') {
            appended.push('\n');
        }
        Some(appended)
    }

    /// Append `block` (preceded by a blank line) unless `marker` is present.
    ///
    /// Returns `true` when the document changed.
    pub fn ensure_block(&mut self, marker: &str, block: &str) -> bool {
        match self.pending_append(marker, block) {
            Some(appended) => {
                self.text.push_str(&appended);
                true
            }
            None => false,
        }
    }

    /// Current contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Append `block` to the file at `path` unless `marker` is already present.
///
/// The file is only ever appended to, never rewritten.  A missing file is
/// created.  Returns `true` when the file changed.
///
/// # Errors
///
/// Returns an error if the file cannot be read or appended to.
pub fn ensure_block(path: &Path, marker: &str, block: &str) -> Result<bool> {
    let existing = read_or_empty(path)?;
    let Some(appended) = ProfileDocument::parse(&existing).pending_append(marker, block) else {
        return Ok(false);
    };
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {} for append", path.display()))?;
    file.write_all(appended.as_bytes())
        .with_context(|| format!("append to {}", path.display()))?;
    Ok(true)
}

fn read_or_empty(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}

/// Ensures a profile file exists (created empty when missing).
#[derive(Debug, Clone)]
pub struct ProfileFileResource {
    /// File to create.
    pub path: PathBuf,
}

impl ProfileFileResource {
    /// Create a new profile file resource.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Resource for ProfileFileResource {
    fn description(&self) -> String {
        self.path.display().to_string()
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
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent: {}", parent.display()))?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("create {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }
}

/// A marker-guarded block in a text file.
#[derive(Debug, Clone)]
pub struct ProfileBlockResource {
    /// Target file.
    pub path: PathBuf,
    /// Substring identifying the block.
    pub marker: String,
    /// Block text appended after a blank line.
    pub block: String,
    /// Short name used in log output (e.g. "nvm configuration").
    pub label: String,
}

impl ProfileBlockResource {
    /// Create a new block resource.
    #[must_use]
    pub fn new(path: PathBuf, label: &str, marker: &str, block: String) -> Self {
        Self {
            path,
            marker: marker.to_string(),
            block,
            label: label.to_string(),
        }
    }
}

impl Resource for ProfileBlockResource {
    fn description(&self) -> String {
        format!("{} in {}", self.label, self.path.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        let text = read_or_empty(&self.path)?;
        if ProfileDocument::parse(&text).has_marker(&self.marker) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if ensure_block(&self.path, &self.marker, &self.block)? {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}
