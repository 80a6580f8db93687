//! Core logging types: step entries, status, and the [`Log`] trait.

/// Result of one provisioning step, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    /// Human-readable step name, e.g. `topgrade (brew)`.
    pub name: String,
    /// Final status of the step.
    pub status: StepStatus,
    /// Optional detail (skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// All commands of the step succeeded.
    Ok,
    /// The step could not run here, e.g. no supported package manager.
    Skipped,
    /// Commands were printed but not executed.
    DryRun,
    /// A command failed.
    Failed,
}

/// Abstraction over logging backends.
///
/// Command handlers log through this trait so tests can capture output
/// without installing a global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header.
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
    /// Record a step result for the summary.
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>);
}
