//! Top-level command orchestration.
pub mod setup;
pub mod version;

use anyhow::Result;

use crate::logging::Logger;
use crate::tasks::{self, Context, Flow, Task};

/// Execute tasks in order until one fails or asks to stop, then print the
/// summary.
///
/// # Errors
///
/// Returns the first task error; later tasks do not run.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    let mut outcome = Ok(());
    for task in tasks {
        match tasks::execute(task, ctx) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Stop) => break,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }

    log.print_summary();
    outcome
}
