//! Optional CLI tools and global npm packages.
use anyhow::Result;

use super::{Context, Task, TaskResult};

/// One optional install offered to the user.
#[derive(Debug)]
struct Offer<'a> {
    question: String,
    program: &'static str,
    args: Vec<&'a str>,
}

impl Offer<'_> {
    fn command_line(&self) -> String {
        std::iter::once(self.program)
            .chain(self.args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Offer Homebrew CLI tools, Node.js package managers and a formatter.
#[derive(Debug)]
pub struct InstallOptionalTools;

impl Task for InstallOptionalTools {
    fn name(&self) -> &'static str {
        "Install optional tools"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let tools = &ctx.settings.tools;
        let offers = [
            offer("brew", &["install"], &tools.cli, "Install CLI tools"),
            offer(
                "npm",
                &["install", "-g"],
                &tools.package_managers,
                "Install Node.js package managers",
            ),
            offer("npm", &["install", "-g"], &tools.formatters, "Install formatter"),
        ];

        let mut installed = 0u32;
        for offer in offers.into_iter().flatten() {
            if !ctx.confirm(&offer.question, true)? {
                continue;
            }
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would run {}", offer.command_line()));
                continue;
            }
            ctx.run_attached(offer.program, &offer.args, &[])?;
            installed += 1;
        }

        if ctx.dry_run {
            return Ok(TaskResult::DryRun);
        }
        if installed == 0 {
            return Ok(TaskResult::Skipped("nothing installed".to_string()));
        }
        Ok(TaskResult::Ok)
    }
}

/// Build an offer, or `None` when there are no packages to install.
fn offer<'a>(
    program: &'static str,
    base: &[&'a str],
    packages: &'a [String],
    label: &str,
) -> Option<Offer<'a>> {
    if packages.is_empty() {
        return None;
    }
    let mut args = base.to_vec();
    args.extend(packages.iter().map(String::as_str));
    Some(Offer {
        question: format!("{label} ({})?", packages.join(", ")),
        program,
        args,
    })
}
