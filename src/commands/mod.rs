//! Subcommand implementations and the setup they share.
pub mod cert;
pub mod completions;
pub mod containers;
pub mod detect;
pub mod install;
pub mod setup;
pub mod update;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::error::InstallError;
use crate::exec::SystemExecutor;
use crate::install::{CommandTable, InstallRequest, InstallSequencer};
use crate::logging::{Log, Logger, StepStatus};

/// Shared state produced by the common command setup sequence.
///
/// Loads the configuration once and derives the command table and the
/// system executor from it, so each command starts from the same place.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded configuration, or the defaults when no file exists.
    pub config: Config,
    /// Install command table derived from `config`.
    pub table: CommandTable,
    /// Executor with the configured extra search paths.
    pub executor: SystemExecutor,
    /// Whether commands are logged instead of run.
    pub dry_run: bool,
}

impl CommandSetup {
    /// Load configuration and build the command table.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or is
    /// invalid.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let config = match config_path(global) {
            Some(path) => {
                log.debug(&format!("config: {}", path.display()));
                Config::load(&path)?
            }
            None => Config::default(),
        };
        Self::from_config(config, global.dry_run)
    }

    /// Build the shared state from an already loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the elevation prefix or a manager override is
    /// invalid.
    pub fn from_config(config: Config, dry_run: bool) -> Result<Self> {
        let table = config
            .command_table()
            .context("invalid install command configuration")?;
        let executor = SystemExecutor::new().with_search_paths(config.search_paths.clone());
        Ok(Self {
            config,
            table,
            executor,
            dry_run,
        })
    }

    /// A sequencer over the system executor and the configured table.
    #[must_use]
    pub fn sequencer(&self) -> InstallSequencer<'_> {
        InstallSequencer::new(&self.executor, &self.table).dry_run(self.dry_run)
    }
}

/// Resolve the configuration file from `--config`/`DEVKIT_CONFIG` or the
/// XDG default.
fn config_path(global: &GlobalOpts) -> Option<PathBuf> {
    global.config.clone().or_else(|| {
        config::default_path(
            std::env::var("XDG_CONFIG_HOME").ok().as_deref(),
            std::env::var("HOME").ok().as_deref(),
        )
    })
}

/// Install `requests` in order, recording one step per request.
///
/// A request without a usable package manager is skipped with a
/// manual-install hint and the next one runs. A failed command stops the
/// whole sequence. Returns `false` if the sequence was stopped.
pub fn install_all(
    sequencer: &InstallSequencer<'_>,
    requests: &[InstallRequest],
    log: &dyn Log,
) -> bool {
    requests
        .iter()
        .all(|request| install_one(sequencer, request, log) != StepStatus::Failed)
}

/// Install a single request and record its step.
///
/// Returns the recorded status.
pub fn install_one(
    sequencer: &InstallSequencer<'_>,
    request: &InstallRequest,
    log: &dyn Log,
) -> StepStatus {
    let label = request.label();
    log.stage(&format!("Installing {label}"));
    let (status, message) = match sequencer.install(request) {
        Ok(()) if sequencer.is_dry_run() => (StepStatus::DryRun, None),
        Ok(()) => (StepStatus::Ok, None),
        Err(InstallError::NoSupportedManager { package }) => {
            log.warn(&format!(
                "no supported package manager found; install {package} manually"
            ));
            (StepStatus::Skipped, Some("install manually".to_string()))
        }
        Err(e) => {
            log.error(&e.to_string());
            (StepStatus::Failed, Some(e.to_string()))
        }
    };
    log.record_step(&label, status, message.as_deref());
    status
}

/// Print the summary and turn failed or skipped steps into an error.
///
/// # Errors
///
/// Returns an error if any step failed or had to be skipped.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let failed = log.count(StepStatus::Failed);
    if failed > 0 {
        anyhow::bail!("{failed} step(s) failed");
    }
    let skipped = log.count(StepStatus::Skipped);
    if skipped > 0 {
        anyhow::bail!("{skipped} step(s) skipped");
    }
    Ok(())
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::test_helpers::RecordingLog;
    use super::*;
    use crate::exec::RunStatus;
    use crate::exec::test_helpers::FakeExecutor;
    use crate::manager::PackageManagerKind;

    #[test]
    fn records_ok_per_request() {
        let exec = FakeExecutor::new().with_available(&["dnf"]);
        let table = CommandTable::default();
        let log = RecordingLog::default();
        let requests = [InstallRequest::new("git"), InstallRequest::new("make")];
        assert!(install_all(&InstallSequencer::new(&exec, &table), &requests, &log));
        assert_eq!(log.statuses(), [StepStatus::Ok, StepStatus::Ok]);
        assert_eq!(
            exec.commands(),
            ["sudo dnf install -y git", "sudo dnf install -y make"]
        );
    }

    #[test]
    fn missing_manager_skips_and_continues() {
        let exec = FakeExecutor::new();
        let table = CommandTable::default();
        let log = RecordingLog::default();
        let requests = [
            InstallRequest::new("podman"),
            InstallRequest::new("black").manager(PackageManagerKind::Pip),
        ];
        assert!(install_all(&InstallSequencer::new(&exec, &table), &requests, &log));
        assert_eq!(log.statuses(), [StepStatus::Skipped, StepStatus::Ok]);
        assert!(
            log.lines()
                .iter()
                .any(|l| l.starts_with("warn:") && l.contains("install podman manually"))
        );
        assert_eq!(exec.commands(), ["pip install black"]);
    }

    #[test]
    fn failure_stops_remaining_requests() {
        let exec = FakeExecutor::new()
            .with_available(&["apt"])
            .with_statuses(vec![RunStatus::failed(100)]);
        let table = CommandTable::default();
        let log = RecordingLog::default();
        let requests = [InstallRequest::new("curl"), InstallRequest::new("make")];
        assert!(!install_all(&InstallSequencer::new(&exec, &table), &requests, &log));
        assert_eq!(log.statuses(), [StepStatus::Failed]);
        assert_eq!(exec.commands().len(), 1);
    }

    #[test]
    fn dry_run_records_dry_run() {
        let exec = FakeExecutor::new().with_available(&["apk"]);
        let table = CommandTable::default();
        let log = RecordingLog::default();
        let sequencer = InstallSequencer::new(&exec, &table).dry_run(true);
        assert!(install_all(&sequencer, &[InstallRequest::new("git")], &log));
        assert_eq!(log.statuses(), [StepStatus::DryRun]);
        assert!(exec.commands().is_empty());
    }

    #[test]
    fn setup_from_default_config() {
        let setup = CommandSetup::from_config(Config::default(), true).unwrap();
        assert_eq!(setup.table.elevation(), ["sudo"]);
        assert!(setup.sequencer().is_dry_run());
    }

    #[test]
    fn explicit_config_path_wins() {
        let global = GlobalOpts {
            dry_run: false,
            config: Some(PathBuf::from("/tmp/custom.toml")),
        };
        assert_eq!(config_path(&global), Some(PathBuf::from("/tmp/custom.toml")));
    }

    #[test]
    fn init_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "elevation = \"doas\"\n").unwrap();
        let global = GlobalOpts {
            dry_run: false,
            config: Some(path),
        };
        let setup = CommandSetup::init(&global, &RecordingLog::default()).unwrap();
        assert_eq!(setup.table.elevation(), ["doas"]);
    }

    #[test]
    fn init_rejects_unknown_manager_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[managers.pacman]\nargs = [\"-S\"]\n").unwrap();
        let global = GlobalOpts {
            dry_run: false,
            config: Some(path),
        };
        assert!(CommandSetup::init(&global, &RecordingLog::default()).is_err());
    }
}
