// Shared helpers for integration tests.
//
// Provides a scripted executor that records every command instead of
// spawning it, an in-memory log, and a temporary config file builder.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use devkit_cli::config::Config;
use devkit_cli::exec::{Executor, Invocation, RunStatus};
use devkit_cli::logging::{Log, StepEntry, StepStatus};

/// Executor that records invocations and answers from scripted statuses.
///
/// Commands succeed once the scripted statuses run out. A status of `None`
/// simulates a program that cannot be spawned. A successful command can put
/// a program on the search path (see [`ScriptedExecutor::installs`]).
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    available: Mutex<HashSet<String>>,
    installs: Vec<(String, String)>,
    statuses: Mutex<VecDeque<Option<RunStatus>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    /// Executor on which `programs` resolve through `which`.
    pub fn with_programs(programs: &[&str]) -> Self {
        Self {
            available: Mutex::new(programs.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    /// Make `program` resolve once a command containing `marker` succeeds.
    pub fn installs(mut self, marker: &str, program: &str) -> Self {
        self.installs.push((marker.to_string(), program.to_string()));
        self
    }

    /// Queue the exit codes returned by successive commands.
    pub fn exit_codes(self, codes: &[i32]) -> Self {
        self.statuses.lock().expect("statuses lock").extend(
            codes
                .iter()
                .map(|&code| Some(if code == 0 { RunStatus::ok() } else { RunStatus::failed(code) })),
        );
        self
    }

    /// Make the next command fail to spawn.
    pub fn spawn_failure(self) -> Self {
        self.statuses.lock().expect("statuses lock").push_back(None);
        self
    }

    /// Command lines run so far.
    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl Executor for ScriptedExecutor {
    fn run_status(&self, invocation: &Invocation) -> anyhow::Result<RunStatus> {
        let line = invocation.to_string();
        self.calls.lock().expect("calls lock").push(line.clone());
        let status = match self.statuses.lock().expect("statuses lock").pop_front() {
            Some(Some(status)) => status,
            Some(None) => anyhow::bail!("No such file or directory (os error 2)"),
            None => RunStatus::ok(),
        };
        if status.success {
            let mut available = self.available.lock().expect("available lock");
            for (marker, program) in &self.installs {
                if line.contains(marker.as_str()) {
                    available.insert(program.clone());
                }
            }
        }
        Ok(status)
    }

    fn which(&self, program: &str) -> bool {
        self.available.lock().expect("available lock").contains(program)
    }
}

/// [`Log`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
    steps: Mutex<Vec<StepEntry>>,
}

impl MemoryLog {
    /// Logged lines as `<kind>: <message>`.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("lines lock").clone()
    }

    /// Recorded step statuses in order.
    pub fn statuses(&self) -> Vec<StepStatus> {
        self.steps
            .lock()
            .expect("steps lock")
            .iter()
            .map(|s| s.status)
            .collect()
    }

    /// Recorded step names in order.
    pub fn step_names(&self) -> Vec<String> {
        self.steps
            .lock()
            .expect("steps lock")
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    fn push(&self, kind: &str, msg: &str) {
        self.lines
            .lock()
            .expect("lines lock")
            .push(format!("{kind}: {msg}"));
    }
}

impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry run", msg);
    }
    fn record_step(&self, name: &str, status: StepStatus, message: Option<&str>) {
        self.steps.lock().expect("steps lock").push(StepEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}

/// A config file in a temporary directory.
pub struct ConfigFile {
    /// Directory holding the file; deleted on drop.
    pub dir: tempfile::TempDir,
    /// Path of `config.toml` inside `dir`.
    pub path: PathBuf,
}

impl ConfigFile {
    /// Write `content` to a fresh `config.toml`.
    pub fn new(content: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).expect("write config.toml");
        Self { dir, path }
    }

    /// Path to the config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file through the normal config loader.
    pub fn load(&self) -> Config {
        Config::load(&self.path).expect("load config")
    }
}
