use anyhow::Result;

use super::context::Context;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use macsetup_cli::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("declined".into());
/// let stop = TaskResult::Stop("nvm declined".into());
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(stop, TaskResult::Stop(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped (declined by the user or nothing to do).
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
    /// The user declined a prerequisite; end the run successfully.
    Stop(String),
}

/// Counters for tasks that process several resources.
///
/// # Examples
///
/// ```
/// use macsetup_cli::tasks::TaskStats;
///
/// let mut stats = TaskStats::new();
/// stats.changed = 2;
/// stats.already_ok = 4;
///
/// assert_eq!(stats.summary(false), "2 changed, 4 already ok");
/// assert_eq!(stats.summary(true), "2 would change, 4 already ok");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 1 already ok").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        format!("{} {verb}, {} already ok", self.changed, self.already_ok)
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
    }
}

/// Options for the resource processing loop.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOpts<'a> {
    /// Verb for log messages (e.g., "set", "create", "append").
    pub verb: &'a str,
}

impl<'a> ProcessOpts<'a> {
    /// Fix both missing and incorrect resources; errors propagate.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self { verb }
    }
}

/// Check each resource and apply it when it is not already correct.
///
/// In dry-run mode nothing is applied; each pending change is logged.
///
/// # Errors
///
/// Returns the first error from checking or applying a resource.
pub fn apply_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += process_single(ctx, &resource, current, opts)?;
    }
    Ok(stats)
}

/// [`apply_resources`] followed by [`TaskStats::finish`].
///
/// # Errors
///
/// Returns the first error from checking or applying a resource.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskResult> {
    Ok(apply_resources(ctx, resources, opts)?.finish(ctx))
}

fn process_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    resource_state: ResourceState,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match resource_state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        resource_state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if ctx.dry_run {
                let msg = if let ResourceState::Incorrect { ref current } = resource_state {
                    format!("would {} {desc} (currently {current})", opts.verb)
                } else {
                    format!("would {}: {desc}", opts.verb)
                };
                ctx.log.dry_run(&msg);
                delta.changed += 1;
                return Ok(delta);
            }
            match resource.apply()? {
                ResourceChange::Applied => {
                    ctx.log.info(&format!("{}: {desc}", opts.verb));
                    delta.changed += 1;
                }
                ResourceChange::AlreadyCorrect => delta.already_ok += 1,
            }
        }
    }
    Ok(delta)
}
