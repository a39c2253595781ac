//! Shell profile blocks (nvm loader and aliases).
use anyhow::Result;
use std::path::PathBuf;

use super::{Context, ProcessOpts, Task, TaskResult, TaskStats, apply_resources};
use crate::config::Alias;
use crate::resources::profile::{ProfileBlockResource, ProfileFileResource};
use crate::session::SessionEnv;

/// Marker identifying the nvm loader block.
pub const NVM_MARKER: &str = "NVM_DIR";

/// Marker identifying the alias block.
pub const ALIAS_MARKER: &str = "# Custom aliases";

/// Profiles edited regardless of the current shell.
const PROFILE_FILES: &[&str] = &[".zshrc", ".bash_profile"];

/// Add the nvm loader and the alias block to `~/.zshrc` and `~/.bash_profile`.
#[derive(Debug)]
pub struct ConfigureShellProfiles;

impl Task for ConfigureShellProfiles {
    fn name(&self) -> &'static str {
        "Configure shell profiles"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let files: Vec<PathBuf> = PROFILE_FILES.iter().map(|f| ctx.home.join(f)).collect();
        let nvm_block = render_nvm_block(&ctx.session_read());
        let alias_block = render_alias_block(&ctx.settings.aliases);

        let mut stats = TaskStats::new();
        stats += apply_resources(
            ctx,
            files.iter().cloned().map(ProfileFileResource::new),
            &ProcessOpts::apply_all("create"),
        )?;
        stats += apply_resources(
            ctx,
            files.iter().flat_map(|path| {
                [
                    ProfileBlockResource::new(
                        path.clone(),
                        "nvm configuration",
                        NVM_MARKER,
                        nvm_block.clone(),
                    ),
                    ProfileBlockResource::new(
                        path.clone(),
                        "aliases",
                        ALIAS_MARKER,
                        alias_block.clone(),
                    ),
                ]
            }),
            &ProcessOpts::apply_all("append"),
        )?;
        Ok(stats.finish(ctx))
    }
}

/// Loader block for nvm.
///
/// `$HOME/.nvm` is written symbolically; a custom `NVM_DIR` is written
/// literally.
#[must_use]
pub fn render_nvm_block(session: &SessionEnv) -> String {
    let dir = if session.nvm_dir_is_default() {
        "$HOME/.nvm".to_string()
    } else {
        session.nvm_dir.display().to_string()
    };
    format!(
        "# NVM configuration\n\
         export NVM_DIR=\"{dir}\"\n\
         [ -s \"$NVM_DIR/nvm.sh\" ] && \\. \"$NVM_DIR/nvm.sh\"\n\
         [ -s \"$NVM_DIR/bash_completion\" ] && \\. \"$NVM_DIR/bash_completion\"\n"
    )
}

/// Alias block, one `alias name='command'` line per entry.
#[must_use]
pub fn render_alias_block(aliases: &[Alias]) -> String {
    let mut block = format!("{ALIAS_MARKER}\n");
    for alias in aliases {
        block.push_str(&format!(
            "alias {}='{}'\n",
            alias.name,
            alias.command.replace('\'', r"'\''")
        ));
    }
    block
}
