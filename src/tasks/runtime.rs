//! nvm and Node.js installation.
//!
//! nvm is a shell function, so it cannot be loaded into this process.  Every
//! nvm command instead runs through [`Context::nvm`], which sources
//! `$NVM_DIR/nvm.sh` in a child bash.  Activating a Node.js version for the
//! rest of the run means putting its `bin` directory first on the session
//! PATH.
use anyhow::Result;
use std::path::Path;

use super::{Context, Task, TaskResult};

/// Install nvm when it is missing.
#[derive(Debug)]
pub struct InstallNvm;

impl Task for InstallNvm {
    fn name(&self) -> &'static str {
        "Install nvm"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let (installed, nvm_dir) = {
            let session = ctx.session_read();
            (session.nvm_installed(), session.nvm_dir.clone())
        };
        if installed {
            ctx.log
                .info(&format!("nvm is already installed in {}", nvm_dir.display()));
            ctx.session_write().nvm_loaded = true;
            activate_default(ctx)?;
            return Ok(TaskResult::Ok);
        }

        let node = &ctx.settings.node;
        let question = format!("nvm is not installed. Install nvm {}?", node.nvm_version);
        if !ctx.confirm(&question, true)? {
            ctx.log
                .warn("nvm is required to install Node.js; stopping setup here");
            return Ok(TaskResult::Stop("nvm declined".to_string()));
        }

        let url = node.nvm_install_url();
        if ctx.dry_run {
            ctx.log.dry_run(&format!("would download and run {url}"));
            return Ok(TaskResult::DryRun);
        }

        let script = ctx.scripts.fetch(&url)?;
        // The shell stage owns profile edits.
        ctx.run_attached("bash", &["-c", &script], &[("PROFILE", "/dev/null")])?;

        let session_script = ctx.session_read().nvm_script();
        if !session_script.is_file() {
            anyhow::bail!(
                "nvm installer finished but {} is missing",
                session_script.display()
            );
        }
        ctx.session_write().nvm_loaded = true;
        ctx.log.info(&format!("nvm {} installed", node.nvm_version));
        activate_default(ctx)?;
        Ok(TaskResult::Ok)
    }
}

/// Install a Node.js version through nvm and activate it for the session.
#[derive(Debug)]
pub struct InstallNode;

impl Task for InstallNode {
    fn name(&self) -> &'static str {
        "Install Node.js"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.session_read().nvm_loaded
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let default_version = &ctx.settings.node.default_version;

        if ctx.which("node") {
            let current = ctx.run("node", &["--version"])?;
            let current = current.stdout.trim();
            ctx.log.info(&format!("Node.js {current} is already active"));
            if !ctx.confirm("Install a different Node.js version?", false)? {
                return Ok(TaskResult::Skipped(format!("keeping {current}")));
            }
            let version = ctx.ask("Node.js version to install", default_version)?;
            return install_version(ctx, &version, false);
        }

        let version = ctx.ask("Node.js version to install", default_version)?;
        install_version(ctx, &version, true)
    }
}

/// `nvm install` + `nvm use`, optionally `nvm alias default`, then put the
/// version's `bin` directory first on the session PATH.
fn install_version(ctx: &Context, version: &str, set_default: bool) -> Result<TaskResult> {
    if ctx.dry_run {
        ctx.log.dry_run(&format!("would run nvm install {version}"));
        ctx.log.dry_run(&format!("would run nvm use {version}"));
        if set_default {
            ctx.log
                .dry_run(&format!("would run nvm alias default {version}"));
        }
        return Ok(TaskResult::DryRun);
    }

    ctx.nvm(&["install", version])?;
    ctx.nvm(&["use", version])?;
    if set_default {
        ctx.nvm(&["alias", "default", version])?;
        ctx.log.info(&format!("default Node.js set to {version}"));
    }

    let which = ctx.nvm(&["which", version])?;
    match node_bin_dir(&which.stdout) {
        Some(bin) => {
            ctx.log.debug(&format!("adding {} to PATH", bin.display()));
            ctx.session_write().prepend_path(bin);
        }
        None => ctx
            .log
            .warn(&format!("could not locate the node binary for {version}")),
    }

    let active = ctx.run_unchecked("node", &["--version"])?;
    let active = active.stdout.trim();
    let shown = if active.is_empty() { version } else { active };
    ctx.log.info(&format!("Node.js {shown} active for this session"));
    Ok(TaskResult::Ok)
}

/// Activate the version behind nvm's `default` alias, as a new login shell
/// would.  Without an alias the session PATH is left alone.
fn activate_default(ctx: &Context) -> Result<()> {
    let which = ctx.nvm_unchecked(&["which", "default"])?;
    if !which.success {
        ctx.log.debug("nvm has no default Node.js version yet");
        return Ok(());
    }
    if let Some(bin) = node_bin_dir(&which.stdout) {
        ctx.log
            .debug(&format!("activating default Node.js from {}", bin.display()));
        ctx.session_write().prepend_path(bin);
    }
    Ok(())
}

/// Parent directory of the node binary `nvm which` printed last.
fn node_bin_dir(stdout: &str) -> Option<&Path> {
    stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .and_then(|node| Path::new(node).parent())
}
