//! Core logging types: task entries, status, and the [`Log`] trait.

/// Task execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable task name.
    pub name: String,
    /// Final status of the task.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task completed successfully.
    Ok,
    /// Task did not apply in the current session (e.g. nvm unavailable in a dry run).
    NotApplicable,
    /// The user declined the task, or its target was already in place.
    Skipped,
    /// Task ran in dry-run mode; no changes were applied.
    DryRun,
    /// The user declined a prerequisite and the run ended here.
    Stopped,
    /// Task encountered an error and the run was aborted.
    Failed,
}

impl TaskStatus {
    /// Statuses counted on the summary's totals line, in display order.
    pub const TOTALS: [Self; 5] = [
        Self::Ok,
        Self::Skipped,
        Self::DryRun,
        Self::Stopped,
        Self::Failed,
    ];

    /// Summary marker.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::NotApplicable => "·",
            Self::Skipped => "○",
            Self::DryRun => "~",
            Self::Stopped => "■",
            Self::Failed => "✗",
        }
    }

    /// ANSI color of the summary line.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Ok => "\x1b[32m",
            Self::NotApplicable => "\x1b[2m",
            Self::Skipped | Self::Stopped => "\x1b[33m",
            Self::DryRun => "\x1b[37m",
            Self::Failed => "\x1b[31m",
        }
    }

    /// Name used on the totals line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "not applicable",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

/// Abstraction over logging backends.
///
/// Task code logs through this trait so tests can substitute a recording
/// implementation.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a task result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
