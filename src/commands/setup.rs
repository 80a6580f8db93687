//! `setup`: bootstrap Homebrew, install the base tools, optionally configure
//! git, then update the system.
use anyhow::Result;

use crate::cli::{GlobalOpts, SetupOpts};
use crate::exec::Executor;
use crate::git::{self, GitIdentity};
use crate::install::{InstallSequencer, run_queue};
use crate::logging::{Log, Logger, StepStatus};
use crate::recipes;

use super::{CommandSetup, install_all, install_one, update};

/// Run the setup command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or any step fails.
pub fn run(global: &GlobalOpts, opts: &SetupOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    provision(&setup.sequencer(), &setup.executor, opts, log);
    super::finish(log)
}

/// Install the dependencies, configure git if asked, then update.
///
/// Homebrew is bootstrapped on its own, independent of the system package
/// manager. The brew-managed tools are skipped when `brew` still does not
/// resolve afterwards. Stops after the first failed step.
pub fn provision(
    sequencer: &InstallSequencer<'_>,
    executor: &dyn Executor,
    opts: &SetupOpts,
    log: &dyn Log,
) {
    if !bootstrap_homebrew(sequencer, executor, log) {
        return;
    }
    if sequencer.is_dry_run() || executor.which("brew") {
        if !install_all(sequencer, &recipes::brew_tools(), log) {
            return;
        }
    } else {
        for request in recipes::brew_tools() {
            let label = request.label();
            log.warn(&format!("brew is not available; skipping {label}"));
            log.record_step(&label, StepStatus::Skipped, Some("brew unavailable"));
        }
    }
    if opts.dev && !install_all(sequencer, &recipes::dev_tools(), log) {
        return;
    }
    if let (Some(name), Some(email)) = (&opts.git_name, &opts.git_email) {
        let identity = GitIdentity::new(name, email);
        if !configure_git(executor, &identity, sequencer.is_dry_run(), log) {
            return;
        }
    }
    update::update_system(executor, sequencer.is_dry_run(), log);
}

/// Make sure curl is present, then run the Homebrew installer.
///
/// Returns `false` if a step failed and provisioning should stop.
fn bootstrap_homebrew(
    sequencer: &InstallSequencer<'_>,
    executor: &dyn Executor,
    log: &dyn Log,
) -> bool {
    const STEP: &str = "homebrew";

    let curl = recipes::curl();
    let curl_status = if executor.which("curl") {
        log.debug("curl already installed");
        log.record_step(&curl.label(), StepStatus::Ok, Some("already installed"));
        StepStatus::Ok
    } else {
        install_one(sequencer, &curl, log)
    };

    log.stage("Bootstrapping Homebrew");
    let bootstrap = recipes::homebrew_bootstrap();
    match curl_status {
        StepStatus::Failed => return false,
        StepStatus::Skipped => {
            log.warn("curl is not available; install Homebrew manually");
            log.record_step(STEP, StepStatus::Skipped, Some("curl unavailable"));
            return true;
        }
        StepStatus::Ok | StepStatus::DryRun => {}
    }
    if sequencer.is_dry_run() {
        log.dry_run(&bootstrap.to_string());
        log.record_step(STEP, StepStatus::DryRun, None);
        return true;
    }

    if executor.which("brew") {
        log.debug("brew already installed");
        log.record_step(STEP, StepStatus::Ok, Some("already installed"));
        return true;
    }
    match run_queue(executor, std::slice::from_ref(&bootstrap)) {
        Ok(()) => {
            log.record_step(STEP, StepStatus::Ok, None);
            true
        }
        Err(e) => {
            log.error(&e.to_string());
            log.record_step(STEP, StepStatus::Failed, Some(&e.to_string()));
            false
        }
    }
}

fn configure_git(
    executor: &dyn Executor,
    identity: &GitIdentity,
    dry_run: bool,
    log: &dyn Log,
) -> bool {
    const STEP: &str = "git identity";
    log.stage("Configuring git");

    if dry_run {
        for cmd in identity.commands() {
            log.dry_run(&cmd.to_string());
        }
        log.record_step(STEP, StepStatus::DryRun, None);
        return true;
    }

    match git::configure_identity(executor, identity) {
        Ok(()) => {
            log.record_step(STEP, StepStatus::Ok, None);
            true
        }
        Err(e) => {
            log.error(&e.to_string());
            log.record_step(STEP, StepStatus::Failed, Some(&e.to_string()));
            false
        }
    }
}
