//! Closing report.
use anyhow::Result;

use super::{Context, Task, TaskResult};

/// Where to register the public key.
pub const GITHUB_KEYS_URL: &str = "https://github.com/settings/keys";

const VERSION_CHECKS: &[(&str, &str)] = &[
    ("Homebrew", "brew"),
    ("git", "git"),
    ("Node.js", "node"),
    ("npm", "npm"),
];

/// Read-only closing report.
#[derive(Debug)]
pub struct PrintSummary;

impl Task for PrintSummary {
    fn name(&self) -> &'static str {
        "Summary"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        for (label, program) in VERSION_CHECKS {
            let version = tool_version(ctx, program)?;
            ctx.log.info(&format!("{label}: {version}"));
        }

        let (nvm_installed, nvm_dir, key, profile) = {
            let session = ctx.session_read();
            (
                session.nvm_installed(),
                session.nvm_dir.clone(),
                session.ssh_key_path(),
                session.shell.profile_path(&session.home),
            )
        };
        if nvm_installed {
            ctx.log
                .info(&format!("nvm: installed in {}", nvm_dir.display()));
        } else {
            ctx.log.info("nvm: not installed");
        }
        let has_key = key.exists();
        if has_key {
            ctx.log.info(&format!("SSH key: {}", key.display()));
        } else {
            ctx.log.info("SSH key: none");
        }

        ctx.log.info("Next steps:");
        ctx.log.info(&format!(
            "  restart your terminal or run: source {}",
            profile.display()
        ));
        if has_key {
            ctx.log
                .info(&format!("  add your SSH public key at {GITHUB_KEYS_URL}"));
        }
        Ok(TaskResult::Ok)
    }
}

/// First line of `<program> --version`, or `not installed`.
fn tool_version(ctx: &Context, program: &str) -> Result<String> {
    const MISSING: &str = "not installed";
    if !ctx.which(program) {
        return Ok(MISSING.to_string());
    }
    let result = ctx.run_unchecked(program, &["--version"])?;
    let first = result.stdout.lines().next().map(str::trim).unwrap_or_default();
    if result.success && !first.is_empty() {
        Ok(first.to_string())
    } else {
        Ok(MISSING.to_string())
    }
}
