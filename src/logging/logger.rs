//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, StepEntry, StepStatus};
use super::utils::log_file_path;
use super::{DRY_RUN_TARGET, STAGE_TARGET};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Messages go through [`tracing`]; the file layer installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) mirrors all of
/// them to `$XDG_CACHE_HOME/devkit/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    steps: Mutex<Vec<StepEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// created by the subscriber.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            steps: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded step entries.
    #[must_use]
    pub fn step_entries(&self) -> Vec<StepEntry> {
        self.steps.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only when verbose, log file always).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a step result for the summary.
    pub fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.steps.lock() {
            guard.push(StepEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the recorded steps with `status`.
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps
            .lock()
            .map_or(0, |guard| guard.iter().filter(|s| s.status == status).count())
    }

    /// Print the summary of all recorded steps.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let steps = self.step_entries();
        if steps.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for step in &steps {
            let (icon, color) = match step.status {
                StepStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                StepStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                StepStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                StepStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = step
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", step.name));
        }

        println!();
        let total = ok + skipped + dry_run + failed;
        self.info(&format!(
            "{total} steps: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        self.record_step(name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    fn log_contents(log: &Logger) -> String {
        fs::read_to_string(log.log_path().expect("log path")).unwrap()
    }

    #[test]
    fn new_logger_has_no_steps() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.step_entries().is_empty());
        assert_eq!(log.count(StepStatus::Failed), 0);
    }

    #[test]
    fn record_step_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_step("git (system)", StepStatus::Skipped, Some("no package manager"));
        let steps = log.step_entries();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].name, "git (system)");
        assert_eq!(steps[0].message.as_deref(), Some("no package manager"));
    }

    #[test]
    fn count_by_status() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_step("a", StepStatus::Ok, None);
        log.record_step("b", StepStatus::Failed, Some("exit 1"));
        log.record_step("c", StepStatus::DryRun, None);
        log.record_step("d", StepStatus::Failed, None);
        assert_eq!(log.count(StepStatus::Failed), 2);
        assert_eq!(log.count(StepStatus::DryRun), 1);
        assert_eq!(log.count(StepStatus::Skipped), 0);
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_step("via-trait", StepStatus::Ok, None);
        assert_eq!(log.step_entries().len(), 1);
    }

    #[test]
    fn log_file_has_header() {
        let (log, _tmp, _guard) = isolated_logger();
        let contents = log_contents(&log);
        assert!(contents.starts_with("=========="));
        assert!(contents.contains("devkit "));
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = log_contents(&log);
        assert!(contents.contains("[debug]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn stage_written_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("Installing topgrade");
        assert!(log_contents(&log).contains("==> Installing topgrade"));
    }

    #[test]
    fn dry_run_written_with_tag() {
        let (log, _tmp, _guard) = isolated_logger();
        log.dry_run("sudo apt install -y git");
        assert!(log_contents(&log).contains("[dry run] sudo apt install -y git"));
    }

    #[test]
    fn warn_and_error_tagged() {
        let (log, _tmp, _guard) = isolated_logger();
        log.warn("careful");
        log.error("broken");
        let contents = log_contents(&log);
        assert!(contents.contains("[warn] careful"));
        assert!(contents.contains("[error] broken"));
    }

    #[test]
    fn summary_is_written_without_ansi() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_step("curl (system)", StepStatus::Ok, None);
        log.record_step("topgrade (brew)", StepStatus::Failed, Some("exit 1"));
        log.print_summary();
        let contents = log_contents(&log);
        assert!(contents.contains("==> Summary"));
        assert!(contents.contains("✗ topgrade (brew) (exit 1)"));
        assert!(contents.contains("2 steps: 1 ok, 0 skipped, 0 dry-run, 1 failed"));
        assert!(!contents.contains('\x1b'));
    }
}
