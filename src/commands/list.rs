//! Command: list phases and steps.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::Plan;
use crate::logging::Log;

/// One line per phase and per step, with its flags and skip condition.
#[must_use]
pub fn render(plan: &Plan) -> Vec<String> {
    let mut lines = Vec::new();
    for phase in &plan.phases {
        lines.push(format!("{}:", phase.name));
        for step in &phase.steps {
            let mut flags = Vec::new();
            if step.blocking {
                flags.push("blocking");
            }
            if step.requires_privilege {
                flags.push("sudo");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            let condition = step
                .precondition
                .as_ref()
                .map_or_else(|| "always runs".to_string(), |p| format!("skip if {}", p.describe()));
            lines.push(format!("  {}{flags} ({condition})", step.name));
        }
    }
    lines
}

/// Run the list command.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    for line in render(&setup.plan) {
        println!("{line}");
    }
    Ok(())
}
