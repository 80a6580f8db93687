//! `update`: run the system updater.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::exec::Executor;
use crate::install::run_queue;
use crate::logging::{Log, Logger, StepStatus};
use crate::recipes;

use super::CommandSetup;

/// Run the update command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or the updater fails.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    update_system(&setup.executor, setup.dry_run, log);
    super::finish(log)
}

/// Run the system updater and record the result as one step.
pub fn update_system(executor: &dyn Executor, dry_run: bool, log: &dyn Log) {
    let cmd = recipes::update_command();
    let name = cmd.program().to_string();
    log.stage("Updating system");

    if dry_run {
        log.dry_run(&cmd.to_string());
        log.record_step(&name, StepStatus::DryRun, None);
        return;
    }
    if !executor.which(cmd.program()) {
        log.warn(&format!("{name} not found; run `devkit setup` first"));
        log.record_step(&name, StepStatus::Skipped, Some("not installed"));
        return;
    }

    match run_queue(executor, std::slice::from_ref(&cmd)) {
        Ok(()) => log.record_step(&name, StepStatus::Ok, None),
        Err(e) => {
            log.error(&e.to_string());
            log.record_step(&name, StepStatus::Failed, Some(&e.to_string()));
        }
    }
}
