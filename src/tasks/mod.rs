//! Named, ordered provisioning stages.
mod context;
pub mod git;
pub mod homebrew;
mod processing;
pub mod runtime;
pub mod shell;
pub mod summary;
pub mod tools;

pub use context::{Context, NVM_SHIM};
pub use processing::{
    ProcessOpts, TaskResult, TaskStats, apply_resources, process_resources,
};

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies given the state left by earlier tasks.
    fn should_run(&self, ctx: &Context) -> bool {
        let _ = ctx;
        true
    }

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if an external command fails, a file cannot be
    /// written, or an answer cannot be read.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// What the runner does after a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Carry on with the next task.
    Continue,
    /// End the run successfully.
    Stop,
}

/// The provisioning sequence, in execution order.
#[must_use]
pub fn all_setup_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(homebrew::InstallHomebrew),
        Box::new(git::ConfigureGit),
        Box::new(runtime::InstallNvm),
        Box::new(runtime::InstallNode),
        Box::new(shell::ConfigureShellProfiles),
        Box::new(tools::InstallOptionalTools),
        Box::new(summary::PrintSummary),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// # Errors
///
/// Returns the task's error, prefixed with the task name, after recording
/// it as failed.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<Flow> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(Flow::Continue);
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Ok(TaskResult::Stop(reason)) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Stopped, Some(&reason));
            return Ok(Flow::Stop);
        }
        Err(e) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            return Err(e.context(format!("{} failed", task.name())));
        }
    }
    Ok(Flow::Continue)
}
