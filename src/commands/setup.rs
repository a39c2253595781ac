//! Command: run the interactive setup sequence.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, SetupOpts};
use crate::config::Settings;
use crate::exec::{Executor, SystemExecutor};
use crate::fetch::{HttpScriptSource, ScriptSource};
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::prompt::{LineReader, Prompter, StdinReader};
use crate::tasks::{self, Context, Task};

use super::version::version;

/// What a setup run acts on: the user's home, the process runner, installer
/// downloads and the answer source.
pub struct Host {
    /// Home directory of the invoking user.
    pub home: PathBuf,
    /// Runs every external command.
    pub executor: Arc<dyn Executor>,
    /// Downloads installer scripts.
    pub scripts: Arc<dyn ScriptSource>,
    /// Answers to interactive questions.
    pub input: Box<dyn LineReader>,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("home", &self.home)
            .field("executor", &self.executor)
            .field("scripts", &"<dyn ScriptSource>")
            .field("input", &self.input)
            .finish()
    }
}

impl Host {
    /// The real machine: `$HOME`, spawned processes, HTTPS downloads and
    /// standard input.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset or empty.
    pub fn system() -> Result<Self> {
        Ok(Self {
            home: resolve_home()?,
            executor: Arc::new(SystemExecutor),
            scripts: Arc::new(HttpScriptSource),
            input: Box::new(StdinReader),
        })
    }
}

/// Run the interactive setup sequence on this machine.
///
/// # Errors
///
/// Returns an error if the platform is not macOS, `HOME` is unset, the
/// settings file is malformed, or a task fails.
pub fn run(global: &GlobalOpts, opts: &SetupOpts, log: &Arc<Logger>) -> Result<()> {
    run_with(&Platform::detect(), global, opts, log, Host::system)
}

/// Run the setup sequence for `platform` against the host built by `host`.
///
/// The platform is checked before `host` is called, so an unsupported
/// platform exits without touching anything.
///
/// # Errors
///
/// Returns an error if the platform is not macOS, `host` fails, the
/// settings file is malformed, or a task fails.
pub fn run_with(
    platform: &Platform,
    global: &GlobalOpts,
    opts: &SetupOpts,
    log: &Arc<Logger>,
    host: impl FnOnce() -> Result<Host>,
) -> Result<()> {
    platform.guard()?;

    log.info(&format!("macsetup {}", version()));
    if global.dry_run {
        log.info("dry run: nothing will be changed");
    }

    let host = host()?;
    let settings_path = global
        .config
        .clone()
        .unwrap_or_else(|| Settings::default_path(&host.home));
    let settings = Settings::load(&settings_path)?;
    log.debug(&format!("settings: {}", settings_path.display()));

    let prompt = Prompter::new(host.input).assume_defaults(global.yes);
    let ctx = Context::new(
        Arc::new(settings),
        Arc::new(platform.clone()),
        Arc::clone(log) as Arc<dyn Log>,
        Arc::new(prompt),
        global.dry_run,
        host.home,
        host.executor,
        host.scripts,
    );

    let all_tasks = tasks::all_setup_tasks();
    let selected = select_tasks(&all_tasks, opts);
    super::run_tasks_to_completion(selected, &ctx, log)
}

/// Home directory of the invoking user.
///
/// # Errors
///
/// Returns an error if `HOME` is unset or empty.
fn resolve_home() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .context("HOME is not set")
}

/// Filter tasks by `--only` (substring match, case-insensitive), else by
/// `--skip`.
#[must_use]
pub fn select_tasks<'a>(all: &'a [Box<dyn Task>], opts: &SetupOpts) -> Vec<&'a dyn Task> {
    all.iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !opts.only.is_empty() {
                return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            if !opts.skip.is_empty() {
                return !opts.skip.iter().any(|s| name.contains(&s.to_lowercase()));
            }
            true
        })
        .map(AsRef::as_ref)
        .collect()
}
