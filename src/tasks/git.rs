//! Git identity and the GitHub SSH key.
use anyhow::{Context as _, Result};

use super::{Context, ProcessOpts, Task, TaskResult, process_resources};
use crate::resources::Resource as _;
use crate::resources::git_config::{GitConfigResource, read_global};
use crate::resources::profile;
use crate::resources::ssh_key::{SshKeyResource, parse_agent_env, public_key_path};

/// Marker for the GitHub host block in `~/.ssh/config`.
const SSH_CONFIG_MARKER: &str = "Host github.com";

const SSH_CONFIG_BLOCK: &str = "Host github.com
  AddKeysToAgent yes
  UseKeychain yes
  IdentityFile ~/.ssh/id_ed25519
";

/// Configure the global git identity and, optionally, an SSH key.
#[derive(Debug)]
pub struct ConfigureGit;

impl Task for ConfigureGit {
    fn name(&self) -> &'static str {
        "Configure git"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.confirm("Configure git user name and email?", true)? {
            return Ok(TaskResult::Skipped("declined".to_string()));
        }

        let settings = &ctx.settings.git;
        let env = ctx.env();
        let current_name = read_global(&*ctx.executor, &env, "user.name")?;
        let current_email = read_global(&*ctx.executor, &env, "user.email")?;

        let name = ctx.ask(
            "Git user name",
            or_placeholder(&current_name, &settings.placeholder_name),
        )?;
        let email = ctx.ask(
            "Git user email",
            or_placeholder(&current_email, &settings.placeholder_email),
        )?;

        let pull_rebase = settings.pull_rebase.to_string();
        let entries = [
            ("user.name", name.as_str()),
            ("user.email", email.as_str()),
            ("init.defaultBranch", settings.default_branch.as_str()),
            ("pull.rebase", pull_rebase.as_str()),
        ];
        let result = process_resources(
            ctx,
            entries
                .iter()
                .map(|(key, value)| GitConfigResource::new(key, value, &*ctx.executor, &env)),
            &ProcessOpts::apply_all("set"),
        )?;

        ctx.log.info(&format!("git identity: {name} <{email}>"));
        ctx.session_write().git_email = Some(email.clone());

        configure_ssh_key(ctx, &email)?;
        Ok(result)
    }
}

fn or_placeholder<'a>(current: &'a str, placeholder: &'a str) -> &'a str {
    if current.is_empty() { placeholder } else { current }
}

/// Generate `~/.ssh/id_ed25519` unless it exists, load it into the agent and
/// keychain, and print the public key.
fn configure_ssh_key(ctx: &Context, email: &str) -> Result<()> {
    if !ctx.confirm("Set up an SSH key for GitHub?", true)? {
        ctx.log.info("skipping SSH key setup");
        return Ok(());
    }

    let key = ctx.session_read().ssh_key_path();
    if key.exists() {
        ctx.log.warn(&format!(
            "SSH key already exists at {}; leaving it untouched",
            key.display()
        ));
        return Ok(());
    }

    let comment = ctx.ask("Email for the SSH key", email)?;
    if ctx.dry_run {
        ctx.log.dry_run(&format!(
            "would generate ed25519 key {} ({comment})",
            key.display()
        ));
        ctx.log
            .dry_run("would add the key to ssh-agent and the macOS keychain");
        return Ok(());
    }

    let env = ctx.env();
    SshKeyResource::new(key.clone(), &comment, &*ctx.executor, &env).apply()?;
    ctx.log.info(&format!("generated {}", key.display()));

    let agent = ctx.run("ssh-agent", &["-s"])?;
    ctx.session_write().ssh_agent = parse_agent_env(&agent.stdout);

    let key_arg = key.to_string_lossy();
    ctx.run("ssh-add", &["--apple-use-keychain", &key_arg])?;

    let ssh_config = ctx.home.join(".ssh").join("config");
    if profile::ensure_block(&ssh_config, SSH_CONFIG_MARKER, SSH_CONFIG_BLOCK)? {
        ctx.log
            .info(&format!("added github.com entry to {}", ssh_config.display()));
    }

    let public_path = public_key_path(&key);
    let public = std::fs::read_to_string(&public_path)
        .with_context(|| format!("read {}", public_path.display()))?;
    ctx.log.info("SSH key created; add this public key to GitHub:");
    ctx.log.info(public.trim());
    Ok(())
}
