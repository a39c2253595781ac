// Shared helpers for integration tests.
//
// Provides a stateful fake Mac behind the `Executor` trait: it remembers
// global git config, creates nvm.sh when the nvm installer runs, tracks
// installed Node.js versions and the nvm default alias, and writes key files
// for ssh-keygen.  Each `Harness` owns a temporary HOME that survives across
// runs, so a second `context()` behaves like running the tool again on the
// same machine.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::Result;

use macsetup_cli::commands::setup::Host;
use macsetup_cli::config::Settings;
use macsetup_cli::error::CommandFailed;
use macsetup_cli::exec::{EnvVars, ExecResult, Executor};
use macsetup_cli::fetch::ScriptSource;
use macsetup_cli::logging::{Log, TaskStatus};
use macsetup_cli::platform::{Platform, ShellKind};
use macsetup_cli::prompt::{Prompter, ScriptedInput};
use macsetup_cli::session::SessionEnv;
use macsetup_cli::tasks::{Context, NVM_SHIM};

/// Version `nvm install lts/*` resolves to.
pub const LTS_VERSION: &str = "v20.11.1";

#[derive(Debug, Default)]
struct MachineState {
    calls: Vec<String>,
    programs: BTreeSet<String>,
    git_config: BTreeMap<String, String>,
    node_versions: BTreeSet<String>,
    default_alias: Option<String>,
    failures: Vec<(String, i32)>,
}

/// Fake machine: every command is recorded and simulated.
#[derive(Debug, Default)]
pub struct FakeMac {
    state: Mutex<MachineState>,
}

fn ok(stdout: &str) -> ExecResult {
    ExecResult {
        stdout: stdout.to_string(),
        stderr: String::new(),
        success: true,
        code: Some(0),
    }
}

fn failed(code: i32, stderr: &str) -> ExecResult {
    ExecResult {
        stdout: String::new(),
        stderr: stderr.to_string(),
        success: false,
        code: Some(code),
    }
}

fn env_var<'a>(env: &'a EnvVars, key: &str) -> Option<&'a str> {
    env.iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// `lts/*` -> [`LTS_VERSION`], `18` -> `v18.0.0`, `v21.1.0` unchanged.
pub fn resolve_node_version(requested: &str) -> String {
    if requested.contains('/') {
        return LTS_VERSION.to_string();
    }
    let bare = requested.trim_start_matches('v');
    let padded = match bare.matches('.').count() {
        0 => format!("{bare}.0.0"),
        1 => format!("{bare}.0"),
        _ => bare.to_string(),
    };
    format!("v{padded}")
}

/// Directory `nvm which` reports for `version`.
pub fn node_bin_dir(nvm_dir: &Path, version: &str) -> PathBuf {
    nvm_dir
        .join("versions")
        .join("node")
        .join(resolve_node_version(version))
        .join("bin")
}

/// Node.js version whose bin directory comes first on `PATH`.
fn active_node(env: &EnvVars) -> Option<String> {
    let path = env_var(env, "PATH")?;
    std::env::split_paths(path).find_map(|dir| {
        let parent = dir.parent()?;
        let grand = parent.parent()?;
        (dir.ends_with("bin") && grand.ends_with("versions/node"))
            .then(|| parent.file_name()?.to_str().map(String::from))
            .flatten()
    })
}

impl FakeMac {
    /// A machine with git and bash available but nothing else set up.
    pub fn new() -> Self {
        let mac = Self::default();
        mac.add_program("git");
        mac.add_program("bash");
        mac
    }

    /// Make `program` resolvable on the search path.
    pub fn add_program(&self, program: &str) {
        self.lock().programs.insert(program.to_string());
    }

    /// Seed a global git config value.
    pub fn set_git_config(&self, key: &str, value: &str) {
        self.lock()
            .git_config
            .insert(key.to_string(), value.to_string());
    }

    /// Fail commands whose rendered line starts with `prefix`.
    pub fn fail_on(&self, prefix: &str, code: i32) {
        self.lock().failures.push((prefix.to_string(), code));
    }

    /// Every rendered command line, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Whether any recorded command starts with `prefix`.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    /// Global git config value.
    pub fn git_config(&self, key: &str) -> Option<String> {
        self.lock().git_config.get(key).cloned()
    }

    /// Installed Node.js versions.
    pub fn node_versions(&self) -> Vec<String> {
        self.lock().node_versions.iter().cloned().collect()
    }

    /// Version the nvm `default` alias points at.
    pub fn default_alias(&self) -> Option<String> {
        self.lock().default_alias.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MachineState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn render(program: &str, args: &[&str]) -> String {
        if program == "bash" && args.get(1) == Some(&NVM_SHIM) {
            return args.get(2..).unwrap_or_default().join(" ");
        }
        std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn record(&self, line: &str) -> Option<i32> {
        let mut state = self.lock();
        state.calls.push(line.to_string());
        state
            .failures
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, code)| *code)
    }

    fn simulate(&self, program: &str, args: &[&str], env: &EnvVars) -> ExecResult {
        match (program, args) {
            ("git", ["config", "--global", "--get", key]) => self
                .git_config(key)
                .map_or_else(|| failed(1, ""), |v| ok(&format!("{v}\n"))),
            ("git", ["config", "--global", key, value]) => {
                self.set_git_config(key, value);
                ok("")
            }
            ("ssh-keygen", [.., "-C", comment, "-f", path, "-N", ""]) => {
                let private = Path::new(path);
                let written = std::fs::write(private, "PRIVATE KEY\n").and_then(|()| {
                    std::fs::write(
                        format!("{path}.pub"),
                        format!("ssh-ed25519 AAAAC3Nza {comment}\n"),
                    )
                });
                written.map_or_else(|e| failed(1, &e.to_string()), |()| ok(""))
            }
            ("ssh-agent", ["-s"]) => ok(
                "SSH_AUTH_SOCK=/tmp/ssh-agent.sock; export SSH_AUTH_SOCK;\n\
                 SSH_AGENT_PID=4242; export SSH_AGENT_PID;\necho Agent pid 4242;\n",
            ),
            ("bash", ["-c", shim, "nvm", rest @ ..]) if *shim == NVM_SHIM => {
                self.simulate_nvm(rest, env)
            }
            ("node", ["--version"]) => active_node(env)
                .map_or_else(|| failed(127, "node: command not found"), |v| ok(&format!("{v}\n"))),
            ("npm", ["--version"]) => ok("10.2.4\n"),
            ("brew", ["--version"]) => ok("Homebrew 4.2.5\n"),
            ("git", ["--version"]) => ok("git version 2.43.0\n"),
            _ => ok(""),
        }
    }

    fn simulate_nvm(&self, args: &[&str], env: &EnvVars) -> ExecResult {
        let Some(nvm_dir) = env_var(env, "NVM_DIR").map(PathBuf::from) else {
            return failed(127, "nvm: NVM_DIR not set");
        };
        if !nvm_dir.join("nvm.sh").is_file() {
            return failed(127, "nvm.sh: No such file or directory");
        }
        match args {
            ["install", version] => {
                self.lock().node_versions.insert(resolve_node_version(version));
                ok("")
            }
            ["which", "default"] => {
                let Some(version) = self.default_alias() else {
                    return failed(3, "N/A: version \"default\" is not yet installed");
                };
                let node = node_bin_dir(&nvm_dir, &version).join("node");
                ok(&format!("{}\n", node.display()))
            }
            ["use", version] | ["which", version] => {
                let resolved = resolve_node_version(version);
                if !self.lock().node_versions.contains(&resolved) {
                    return failed(3, &format!("N/A: version \"{version}\" is not yet installed"));
                }
                if args.first() == Some(&"which") {
                    let node = node_bin_dir(&nvm_dir, version).join("node");
                    return ok(&format!("{}\n", node.display()));
                }
                ok(&format!("Now using node {resolved}\n"))
            }
            ["alias", "default", version] => {
                self.lock().default_alias = Some(resolve_node_version(version));
                ok("")
            }
            _ => ok(""),
        }
    }

    fn run_installer(&self, script: &str, env: &EnvVars) -> Result<()> {
        if script.contains("nvm-sh/nvm") {
            let nvm_dir = env_var(env, "NVM_DIR")
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("NVM_DIR not set"))?;
            std::fs::create_dir_all(&nvm_dir)?;
            std::fs::write(nvm_dir.join("nvm.sh"), "nvm() { :; }\n")?;
        } else if script.contains("Homebrew/install") {
            self.add_program("brew");
        }
        Ok(())
    }
}

impl Executor for FakeMac {
    fn run_unchecked(&self, program: &str, args: &[&str], env: &EnvVars) -> Result<ExecResult> {
        let line = Self::render(program, args);
        if let Some(code) = self.record(&line) {
            return Ok(failed(code, "injected failure"));
        }
        Ok(self.simulate(program, args, env))
    }

    fn run_attached(&self, program: &str, args: &[&str], env: &EnvVars) -> Result<()> {
        let line = Self::render(program, args);
        if let Some(code) = self.record(&line) {
            return Err(CommandFailed {
                label: program.to_string(),
                code: Some(code),
                stderr: String::new(),
            }
            .into());
        }
        if let ["-c", script] = args {
            self.run_installer(script, env)?;
        }
        Ok(())
    }

    fn which(&self, program: &str, search_path: &OsStr) -> bool {
        if program == "node" || program == "npm" {
            return std::env::split_paths(search_path)
                .any(|dir| dir.components().any(|c| c.as_os_str() == "versions"));
        }
        self.lock().programs.contains(program)
    }
}

/// Serves a one-line script naming the requested URL.
#[derive(Debug, Default)]
pub struct EchoScripts {
    fetched: Mutex<Vec<String>>,
}

impl EchoScripts {
    /// URLs downloaded so far.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .map_or_else(|_| vec![], |g| g.clone())
    }
}

impl ScriptSource for EchoScripts {
    fn fetch(&self, url: &str) -> Result<String> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(url.to_string());
        }
        Ok(format!("echo installing from {url}"))
    }
}

/// [`Log`] implementation that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<(&'static str, String)>>,
    tasks: Mutex<Vec<(String, TaskStatus)>>,
}

impl MemoryLog {
    fn push(&self, level: &'static str, msg: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, msg.to_string()));
        }
    }

    /// Messages logged at `level`.
    pub fn messages(&self, level: &str) -> Vec<String> {
        self.lines.lock().map_or_else(
            |_| vec![],
            |g| {
                g.iter()
                    .filter(|(l, _)| *l == level)
                    .map(|(_, m)| m.clone())
                    .collect()
            },
        )
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }

    /// Recorded task results, in order.
    pub fn tasks(&self) -> Vec<(String, TaskStatus)> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Status recorded for `name`, if the task ran.
    pub fn status(&self, name: &str) -> Option<TaskStatus> {
        self.tasks()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }
}

impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, _message: Option<&str>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push((name.to_string(), status));
        }
    }
}

/// An isolated machine: temporary HOME plus the fake executor.
#[derive(Debug)]
pub struct Harness {
    /// Temporary home directory (removed on drop).
    pub home: tempfile::TempDir,
    /// Fake machine shared by every context built from this harness.
    pub mac: Arc<FakeMac>,
    /// Installer downloads shared by every context.
    pub scripts: Arc<EchoScripts>,
    /// Settings used for new contexts.
    pub settings: Settings,
}

impl Harness {
    /// Fresh machine with default settings.
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temp home"),
            mac: Arc::new(FakeMac::new()),
            scripts: Arc::new(EchoScripts::default()),
            settings: Settings::default(),
        }
    }

    /// Path of the temporary home directory.
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// A new session answering prompts with `answers`, then defaults.
    pub fn context(&self, answers: &[&str], dry_run: bool) -> (Context, Arc<MemoryLog>) {
        let log = Arc::new(MemoryLog::default());
        let session = SessionEnv::new(
            self.home(),
            vec![PathBuf::from("/usr/bin"), PathBuf::from("/bin")],
            None,
            ShellKind::Zsh,
        );
        let answers: Vec<String> = answers.iter().map(|a| (*a).to_string()).collect();
        let ctx = Context {
            settings: Arc::new(self.settings.clone()),
            platform: Arc::new(Platform::new("darwin23")),
            log: Arc::clone(&log) as Arc<dyn Log>,
            prompt: Arc::new(Prompter::new(Box::new(ScriptedInput::new(answers)))),
            dry_run,
            home: self.home().to_path_buf(),
            executor: Arc::clone(&self.mac) as Arc<dyn Executor>,
            scripts: Arc::clone(&self.scripts) as Arc<dyn ScriptSource>,
            session: Arc::new(RwLock::new(session)),
        };
        (ctx, log)
    }

    /// Host for a whole `setup` run against this machine.
    pub fn host(&self, answers: &[&str]) -> Host {
        let answers: Vec<String> = answers.iter().map(|a| (*a).to_string()).collect();
        Host {
            home: self.home().to_path_buf(),
            executor: Arc::clone(&self.mac) as Arc<dyn Executor>,
            scripts: Arc::clone(&self.scripts) as Arc<dyn ScriptSource>,
            input: Box::new(ScriptedInput::new(answers)),
        }
    }

    /// Read a file under HOME, or an empty string if it does not exist.
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.home().join(relative)).unwrap_or_default()
    }
}
