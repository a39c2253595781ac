use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;

use crate::config::Settings;
use crate::exec::{ExecResult, Executor};
use crate::fetch::ScriptSource;
use crate::logging::Log;
use crate::platform::Platform;
use crate::prompt::Prompter;
use crate::session::SessionEnv;

/// Sources nvm's activation script in a fresh bash and forwards the
/// remaining arguments to the `nvm` shell function.
pub const NVM_SHIM: &str = r#". "$NVM_DIR/nvm.sh" && nvm "$@""#;

/// Shared context for task execution.
pub struct Context {
    /// Settings (built-in defaults merged with the settings file).
    pub settings: Arc<Settings>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Interactive question answering.
    pub prompt: Arc<Prompter>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// User's home directory path.
    pub home: PathBuf,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Installer script downloads.
    pub scripts: Arc<dyn ScriptSource>,
    /// Environment accumulated by earlier stages.
    ///
    /// Use [`Context::session_read`] / [`Context::session_write`].
    pub session: Arc<RwLock<SessionEnv>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("home", &self.home)
            .field("executor", &self.executor)
            .field("scripts", &"<dyn ScriptSource>")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a new context for task execution.
    ///
    /// The session environment is captured from the current process.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        prompt: Arc<Prompter>,
        dry_run: bool,
        home: PathBuf,
        executor: Arc<dyn Executor>,
        scripts: Arc<dyn ScriptSource>,
    ) -> Self {
        let session = SessionEnv::from_process(&home);
        Self {
            settings,
            platform,
            log,
            prompt,
            dry_run,
            home,
            executor,
            scripts,
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Acquire a shared read lock on the session.
    ///
    /// Recovers from a poisoned lock (which can only occur if a previous task
    /// panicked) by consuming the poison and returning the inner value.
    pub fn session_read(&self) -> RwLockReadGuard<'_, SessionEnv> {
        self.session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Acquire an exclusive write lock on the session.
    pub fn session_write(&self) -> RwLockWriteGuard<'_, SessionEnv> {
        self.session
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Variables passed to every child process.
    #[must_use]
    pub fn env(&self) -> Vec<(String, String)> {
        self.session_read().vars()
    }

    /// Run a command with the session environment; non-zero exit is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits non-zero.
    pub fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.executor.run(program, args, &self.env())
    }

    /// Run a command with the session environment, allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be started.
    pub fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.executor.run_unchecked(program, args, &self.env())
    }

    /// Run a command attached to the terminal with the session environment
    /// plus `extra` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits non-zero.
    pub fn run_attached(&self, program: &str, args: &[&str], extra: &[(&str, &str)]) -> Result<()> {
        let mut env = self.env();
        env.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
        self.executor.run_attached(program, args, &env)
    }

    /// Invoke `nvm <args>` in a shell that has loaded nvm.
    ///
    /// # Errors
    ///
    /// Returns an error if bash cannot be started or nvm exits non-zero.
    pub fn nvm(&self, args: &[&str]) -> Result<ExecResult> {
        let label = format!("nvm {}", args.first().copied().unwrap_or_default());
        self.nvm_unchecked(args)?.check(&label)
    }

    /// Invoke `nvm <args>`, allowing failure.
    ///
    /// # Errors
    ///
    /// Returns an error only if bash cannot be started.
    pub fn nvm_unchecked(&self, args: &[&str]) -> Result<ExecResult> {
        let mut argv = vec!["-c", NVM_SHIM, "nvm"];
        argv.extend_from_slice(args);
        self.executor.run_unchecked("bash", &argv, &self.env())
    }

    /// Whether `program` is on the session PATH.
    #[must_use]
    pub fn which(&self, program: &str) -> bool {
        let path = self.session_read().search_path();
        self.executor.which(program, &path)
    }

    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    pub fn confirm(&self, question: &str, default_is_yes: bool) -> Result<bool> {
        Ok(self.prompt.prompt_yes_no(question, default_is_yes)?)
    }

    /// Ask for a value with a default.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    pub fn ask(&self, question: &str, default: &str) -> Result<String> {
        Ok(self.prompt.prompt_with_default(question, default)?)
    }
}
