//! Process execution boundary.
//!
//! Every external command the tool runs is an [`Invocation`] (a program and
//! an argument list) handed to an [`Executor`]. The executor only reports
//! whether the child exited successfully; output is inherited by the
//! terminal so interactive installers (password prompts, confirmations)
//! keep working.
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};

use crate::error::CommandParseError;

/// A single executable command: program plus arguments.
///
/// Arguments are passed to the child verbatim, never through a shell, so a
/// package name cannot smuggle in shell syntax. Commands that need a shell
/// (pipes, command substitution) are built explicitly with
/// [`Invocation::shell`].
///
/// # Examples
///
/// ```
/// use devkit_cli::exec::Invocation;
///
/// let cmd = Invocation::new("apt").args(["install", "-y", "git"]);
/// assert_eq!(cmd.to_string(), "apt install -y git");
///
/// let parsed = Invocation::parse("echo 'hello world'").unwrap();
/// assert_eq!(parsed.arguments(), ["hello world"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run `script` through `sh -c`.
    #[must_use]
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    /// Split a command line into an invocation using POSIX shell word rules.
    ///
    /// Quoting is honoured but no shell features (pipes, globbing,
    /// variables) are interpreted.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is empty or has unbalanced quotes.
    pub fn parse(line: &str) -> Result<Self, CommandParseError> {
        let words = shell_words::split(line).map_err(|e| CommandParseError::Malformed {
            line: line.to_string(),
            message: e.to_string(),
        })?;
        Self::from_argv(words).ok_or(CommandParseError::Empty)
    }

    /// Build an invocation from a full argument vector (`argv[0]` is the
    /// program). Returns `None` for an empty vector.
    #[must_use]
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut words = argv.into_iter();
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    /// Wrap this invocation in a privilege-escalation prefix such as
    /// `["sudo"]`. An empty prefix leaves the invocation unchanged.
    #[must_use]
    pub fn elevated(self, prefix: &[String]) -> Self {
        let Some((program, prefix_args)) = prefix.split_first() else {
            return self;
        };
        let mut args = prefix_args.to_vec();
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: program.clone(),
            args,
        }
    }

    /// The program to execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments passed to the program.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words =
            std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        f.write_str(&shell_words::join(words))
    }
}

/// Exit information for a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// Whether the command exited with status 0.
    pub success: bool,
    /// The exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl RunStatus {
    /// A successful exit (code 0).
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    /// A failed exit with the given code.
    #[must_use]
    pub const fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

impl From<ExitStatus> for RunStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Abstraction over running external commands.
///
/// Production code uses [`SystemExecutor`]; tests substitute a fake so that
/// detection and sequencing can be exercised without touching the host.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Run `invocation` to completion with inherited stdio.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned. A non-zero exit is
    /// not an error; it is reported through [`RunStatus::success`].
    fn run_status(&self, invocation: &Invocation) -> Result<RunStatus>;

    /// Whether `program` resolves to an executable on the search path.
    fn which(&self, program: &str) -> bool;
}

/// Executor that spawns real child processes.
///
/// Extra search directories are appended to `PATH` both for program
/// resolution and for the child environment. This lets a command find a
/// tool that an earlier command in the same run installed outside the
/// inherited `PATH` (e.g. a fresh Homebrew prefix).
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    extra_paths: Vec<PathBuf>,
}

impl SystemExecutor {
    /// Create an executor that uses the inherited `PATH` only.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            extra_paths: Vec::new(),
        }
    }

    /// Append directories to the search path.
    #[must_use]
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.extra_paths.extend(paths);
        self
    }

    /// `PATH` extended with the configured extra directories, or `None` when
    /// no extra directories are configured.
    fn search_path(&self) -> Option<OsString> {
        if self.extra_paths.is_empty() {
            return None;
        }
        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let dirs = std::env::split_paths(&inherited).chain(self.extra_paths.iter().cloned());
        std::env::join_paths(dirs).ok()
    }

    fn resolve(&self, program: &str) -> Option<PathBuf> {
        resolve_in(program, self.search_path(), std::env::current_dir().ok())
    }
}

/// Find `program` on `search_path` relative to `cwd`.
///
/// Falls back to the inherited `PATH` when there is no extra search path or
/// the working directory is gone.
fn resolve_in(
    program: &str,
    search_path: Option<OsString>,
    cwd: Option<PathBuf>,
) -> Option<PathBuf> {
    match (search_path, cwd) {
        (Some(path), Some(cwd)) => which::which_in(program, Some(path), cwd).ok(),
        (Some(_), None) => {
            tracing::debug!("working directory unavailable; resolving {program} on PATH");
            which::which(program).ok()
        }
        (None, _) => which::which(program).ok(),
    }
}

impl Executor for SystemExecutor {
    fn run_status(&self, invocation: &Invocation) -> Result<RunStatus> {
        let program = self
            .resolve(invocation.program())
            .unwrap_or_else(|| PathBuf::from(invocation.program()));
        let mut cmd = Command::new(program);
        cmd.args(invocation.arguments());
        if let Some(path) = self.search_path() {
            cmd.env("PATH", path);
        }
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute: {invocation}"))?;
        Ok(RunStatus::from(status))
    }

    fn which(&self, program: &str) -> bool {
        self.resolve(program).is_some()
    }
}
