#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the setup sequence.
//!
//! These tests drive the full task list produced by [`all_setup_tasks`]
//! through [`run_tasks_to_completion`] against a fake machine, covering a
//! first run with default answers, a repeated run, the platform guard, declining nvm, fail-fast
//! on a failed command, dry-run, and the `--skip` / `--only` filters.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{Harness, LTS_VERSION};
use macsetup_cli::cli::{GlobalOpts, SetupOpts};
use macsetup_cli::commands::run_tasks_to_completion;
use macsetup_cli::commands::setup::{run_with, select_tasks};
use macsetup_cli::error::exit_code_for;
use macsetup_cli::logging::{Logger, TaskStatus};
use macsetup_cli::platform::Platform;
use macsetup_cli::tasks::{self, Context, homebrew::HOMEBREW_INSTALL_URL};

fn run_all(ctx: &Context) -> anyhow::Result<()> {
    let all = tasks::all_setup_tasks();
    let selected = select_tasks(&all, &SetupOpts::default());
    run_tasks_to_completion(selected, ctx, &Logger::new("test"))
}

// ---------------------------------------------------------------------------
// Structural invariants
// ---------------------------------------------------------------------------

#[test]
fn setup_task_names() {
    let all_tasks = tasks::all_setup_tasks();
    let task_names: Vec<&str> = all_tasks.iter().map(|t| t.name()).collect();
    insta::assert_snapshot!(task_names.join("\n"), @r"
    Install Homebrew
    Configure git
    Install nvm
    Install Node.js
    Configure shell profiles
    Install optional tools
    Summary
    ");
}

#[test]
fn setup_task_names_are_unique() {
    let tasks = tasks::all_setup_tasks();
    let mut seen: HashSet<&str> = HashSet::new();
    for task in &tasks {
        assert!(seen.insert(task.name()), "duplicate task name: {}", task.name());
    }
}

#[test]
fn skip_filter_drops_named_stages() {
    let all = tasks::all_setup_tasks();
    let opts = SetupOpts {
        skip: vec!["optional".to_string()],
        ..SetupOpts::default()
    };
    let names: Vec<&str> = select_tasks(&all, &opts).iter().map(|t| t.name()).collect();
    assert!(!names.contains(&"Install optional tools"));
    assert_eq!(names.len(), all.len() - 1);
}

// ---------------------------------------------------------------------------
// Platform guard
// ---------------------------------------------------------------------------

#[test]
fn non_macos_platform_exits_before_touching_the_machine() {
    let harness = Harness::new();
    let global = GlobalOpts {
        dry_run: false,
        yes: true,
        config: None,
    };
    let log = Arc::new(Logger::new("test"));
    let mut host_built = false;

    let err = run_with(
        &Platform::new("linux-gnu"),
        &global,
        &SetupOpts::default(),
        &log,
        || {
            host_built = true;
            Ok(harness.host(&[]))
        },
    )
    .unwrap_err();

    assert_eq!(exit_code_for(&err), 1);
    assert!(err.to_string().contains("linux-gnu"));
    assert!(!host_built);
    assert!(harness.mac.calls().is_empty());
    assert!(harness.scripts.fetched().is_empty());
    for profile in [".zshrc", ".bash_profile"] {
        assert!(!harness.home().join(profile).exists(), "{profile} written");
    }
    assert!(log.task_entries().is_empty());
}

// ---------------------------------------------------------------------------
// Full runs
// ---------------------------------------------------------------------------

#[test]
fn first_run_with_defaults_provisions_everything() {
    let harness = Harness::new();
    let (ctx, log) = harness.context(&[], false);

    run_all(&ctx).unwrap();

    let statuses: Vec<TaskStatus> = log.tasks().into_iter().map(|(_, s)| s).collect();
    assert_eq!(statuses, vec![TaskStatus::Ok; 7]);

    assert_eq!(harness.mac.git_config("user.name").as_deref(), Some("John Doe"));
    assert_eq!(
        harness.mac.git_config("user.email").as_deref(),
        Some("you@example.com")
    );
    assert_eq!(
        harness.mac.git_config("init.defaultBranch").as_deref(),
        Some("main")
    );

    assert!(harness.home().join(".ssh/id_ed25519").is_file());
    assert!(harness.read(".ssh/config").contains("Host github.com"));
    assert!(harness.mac.called("ssh-add --apple-use-keychain"));
    assert!(log.contains("info", "ssh-ed25519 AAAAC3Nza you@example.com"));

    assert!(harness.home().join(".nvm/nvm.sh").is_file());
    assert_eq!(harness.mac.default_alias().as_deref(), Some(LTS_VERSION));

    for profile in [".zshrc", ".bash_profile"] {
        let text = harness.read(profile);
        assert!(text.contains("export NVM_DIR"), "{profile}: {text}");
        assert!(text.contains("# Custom aliases"), "{profile}: {text}");
    }

    assert!(harness.mac.called("brew install gh jq wget tree"));
    assert!(harness.mac.called("npm install -g yarn pnpm"));
    assert!(harness.mac.called("npm install -g prettier"));

    assert!(log.contains("info", &format!("Node.js: {LTS_VERSION}")));
    assert!(log.contains("info", "source"));

    let fetched = harness.scripts.fetched();
    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0], HOMEBREW_INSTALL_URL);
    assert!(fetched[1].contains("nvm-sh/nvm"));
}

#[test]
fn second_run_leaves_files_byte_identical() {
    let harness = Harness::new();
    let (first, _) = harness.context(&[], false);
    run_all(&first).unwrap();

    let zshrc = harness.read(".zshrc");
    let bash_profile = harness.read(".bash_profile");
    let ssh_config = harness.read(".ssh/config");
    let key = harness.read(".ssh/id_ed25519");

    let (second, log) = harness.context(&[], false);
    run_all(&second).unwrap();

    assert_eq!(harness.read(".zshrc"), zshrc);
    assert_eq!(harness.read(".bash_profile"), bash_profile);
    assert_eq!(harness.read(".ssh/config"), ssh_config);
    assert_eq!(harness.read(".ssh/id_ed25519"), key);

    let keygens = harness
        .mac
        .calls()
        .iter()
        .filter(|c| c.starts_with("ssh-keygen"))
        .count();
    assert_eq!(keygens, 1);
    assert!(log.contains("warn", "already exists"));
    assert!(log.contains("info", "Homebrew is already installed"));
    assert!(log.contains("info", "nvm is already installed"));
    assert!(log.contains("info", "0 changed, 6 already ok"));

    assert_eq!(harness.mac.default_alias().as_deref(), Some(LTS_VERSION));
    assert_eq!(log.status("Install Node.js"), Some(TaskStatus::Skipped));
    let alias_writes = harness
        .mac
        .calls()
        .iter()
        .filter(|c| c.starts_with("nvm alias default"))
        .count();
    assert_eq!(alias_writes, 1);
}

#[test]
fn declining_nvm_ends_the_run_successfully() {
    let harness = Harness::new();
    // Homebrew install, git configuration, nvm install
    let (ctx, log) = harness.context(&["n", "n", "n"], false);

    run_all(&ctx).unwrap();

    assert_eq!(log.status("Install Homebrew"), Some(TaskStatus::Skipped));
    assert_eq!(log.status("Configure git"), Some(TaskStatus::Skipped));
    assert_eq!(log.status("Install nvm"), Some(TaskStatus::Stopped));
    assert_eq!(log.status("Install Node.js"), None);
    assert_eq!(log.status("Summary"), None);
    assert!(!harness.home().join(".zshrc").exists());
    assert!(harness.scripts.fetched().is_empty());
}

#[test]
fn failed_command_aborts_with_its_exit_code() {
    let harness = Harness::new();
    harness.mac.fail_on("git config --global user.email", 2);
    let (ctx, log) = harness.context(&[], false);

    let err = run_all(&ctx).unwrap_err();

    assert_eq!(exit_code_for(&err), 2);
    assert!(format!("{err:#}").starts_with("Configure git failed"));
    assert_eq!(log.status("Configure git"), Some(TaskStatus::Failed));
    assert_eq!(log.status("Install nvm"), None);
    assert!(!harness.mac.called("nvm"));
    assert!(!harness.home().join(".zshrc").exists());
}

#[test]
fn dry_run_only_reads() {
    let harness = Harness::new();
    let (ctx, log) = harness.context(&[], true);

    run_all(&ctx).unwrap();

    for call in harness.mac.calls() {
        assert!(
            call.starts_with("git config --global --get") || call.ends_with("--version"),
            "mutating call in dry run: {call}"
        );
    }
    assert!(harness.scripts.fetched().is_empty());
    assert!(!harness.home().join(".zshrc").exists());
    assert!(!harness.home().join(".ssh").exists());
    assert!(log.contains("dry_run", "would download and run"));
    assert_eq!(log.status("Install Node.js"), Some(TaskStatus::NotApplicable));
}
