//! Homebrew installation.
use anyhow::Result;
use std::path::Path;

use super::{Context, Task, TaskResult};

/// Official Homebrew install script.
pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Where the installer puts `brew` (Apple silicon, then Intel).
const BREW_PREFIXES: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin"];

/// Install Homebrew, or update it when already present.
#[derive(Debug)]
pub struct InstallHomebrew;

impl Task for InstallHomebrew {
    fn name(&self) -> &'static str {
        "Install Homebrew"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if ctx.which("brew") {
            ctx.log.info("Homebrew is already installed");
            if !ctx.confirm("Update Homebrew?", true)? {
                return Ok(TaskResult::Ok);
            }
            if ctx.dry_run {
                ctx.log.dry_run("would run brew update");
                return Ok(TaskResult::DryRun);
            }
            ctx.run_attached("brew", &["update"], &[])?;
            ctx.log.info("Homebrew updated");
            return Ok(TaskResult::Ok);
        }

        if !ctx.confirm("Homebrew is not installed. Install it now?", true)? {
            ctx.log
                .warn("Homebrew not installed; CLI tool installation will be unavailable");
            return Ok(TaskResult::Skipped("declined".to_string()));
        }
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would download and run {HOMEBREW_INSTALL_URL}"));
            return Ok(TaskResult::DryRun);
        }

        let script = ctx.scripts.fetch(HOMEBREW_INSTALL_URL)?;
        ctx.run_attached("/bin/bash", &["-c", &script], &[])?;
        activate_prefix(ctx, BREW_PREFIXES.iter().map(Path::new));
        ctx.log.info("Homebrew installed");
        Ok(TaskResult::Ok)
    }
}

/// Put the first candidate directory containing `brew` on the session PATH.
fn activate_prefix<'a>(ctx: &Context, candidates: impl IntoIterator<Item = &'a Path>) {
    if let Some(dir) = candidates
        .into_iter()
        .find(|dir| dir.join("brew").is_file())
    {
        ctx.log.debug(&format!("adding {} to PATH", dir.display()));
        ctx.session_write().prepend_path(dir);
    }
}
