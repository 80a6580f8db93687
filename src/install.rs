//! Install sequencing: compose and run a package's command queue.
//!
//! An [`InstallRequest`] expands into `pre + [install command] + post`. The
//! install command comes from a [`CommandTable`] that maps each
//! [`PackageManagerKind`] to its argument template and knows the host's
//! elevation prefix. [`InstallSequencer`] runs the queue strictly in order
//! and stops at the first failing command; earlier side effects are left in
//! place.
use std::collections::BTreeMap;

use crate::detect;
use crate::error::InstallError;
use crate::exec::{Executor, Invocation};
use crate::manager::PackageManagerKind;

/// Default privilege-escalation command.
pub const DEFAULT_ELEVATION: &str = "sudo";

/// How a manager's install command is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTemplate {
    /// Arguments between the manager executable and the package, e.g.
    /// `["install", "-y"]`. Empty means the manager has no usable template.
    pub args: Vec<String>,
    /// Whether the command runs behind the elevation prefix.
    pub elevate: bool,
}

impl InstallTemplate {
    /// The built-in template for `kind`.
    #[must_use]
    pub fn default_for(kind: PackageManagerKind) -> Self {
        Self {
            args: kind
                .default_install_args()
                .iter()
                .map(ToString::to_string)
                .collect(),
            elevate: kind.elevates_by_default(),
        }
    }
}

/// Mapping from package manager to install command, plus elevation prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    elevation: Vec<String>,
    overrides: BTreeMap<PackageManagerKind, InstallTemplate>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new(vec![DEFAULT_ELEVATION.to_string()])
    }
}

impl CommandTable {
    /// Create a table with built-in templates and the given elevation
    /// prefix (empty to run everything unprivileged).
    #[must_use]
    pub const fn new(elevation: Vec<String>) -> Self {
        Self {
            elevation,
            overrides: BTreeMap::new(),
        }
    }

    /// Replace the template for one manager.
    #[must_use]
    pub fn with_template(mut self, kind: PackageManagerKind, template: InstallTemplate) -> Self {
        self.overrides.insert(kind, template);
        self
    }

    /// The elevation prefix, e.g. `["sudo"]`.
    #[must_use]
    pub fn elevation(&self) -> &[String] {
        &self.elevation
    }

    /// Wrap `invocation` in the elevation prefix.
    #[must_use]
    pub fn elevate(&self, invocation: Invocation) -> Invocation {
        invocation.elevated(&self.elevation)
    }

    /// The effective template for `kind`.
    #[must_use]
    pub fn template(&self, kind: PackageManagerKind) -> InstallTemplate {
        self.overrides
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| InstallTemplate::default_for(kind))
    }

    /// Build the install command for `package` through `kind`.
    ///
    /// If the template has no arguments the command falls back to the
    /// elevation prefix followed by the package words.
    #[must_use]
    pub fn install_command(
        &self,
        kind: PackageManagerKind,
        package: &str,
        version: Option<&str>,
    ) -> Invocation {
        let template = self.template(kind);
        let package_args = kind.package_args(package, version);

        if template.args.is_empty() {
            let argv = self.elevation.iter().cloned().chain(package_args).collect();
            return Invocation::from_argv(argv).unwrap_or_else(|| Invocation::new(package));
        }

        let cmd = Invocation::new(kind.executable())
            .args(template.args)
            .args(package_args);
        if template.elevate {
            self.elevate(cmd)
        } else {
            cmd
        }
    }
}

/// A single package install: what to install, through which manager, and
/// what to run around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Package (or tool/plugin) name, substituted verbatim.
    pub package: String,
    /// Optional version, rendered per manager.
    pub version: Option<String>,
    /// Explicit manager; `None` means auto-detect a system manager.
    pub manager: Option<PackageManagerKind>,
    /// Commands run before the install command.
    pub pre: Vec<Invocation>,
    /// Commands run after the install command.
    pub post: Vec<Invocation>,
}

impl InstallRequest {
    /// Install `package` through the detected system manager.
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: None,
            manager: None,
            pre: Vec::new(),
            post: Vec::new(),
        }
    }

    /// Parse a `name[:version]` spec.
    ///
    /// ```
    /// use devkit_cli::install::InstallRequest;
    ///
    /// let req = InstallRequest::from_spec("python:3.12.1");
    /// assert_eq!(req.package, "python");
    /// assert_eq!(req.version.as_deref(), Some("3.12.1"));
    /// assert_eq!(InstallRequest::from_spec("git:").version, None);
    /// ```
    #[must_use]
    pub fn from_spec(spec: &str) -> Self {
        let (name, version) = match spec.split_once(':') {
            Some((name, version)) => (name, Some(version)),
            None => (spec, None),
        };
        let req = Self::new(name);
        match version.filter(|v| !v.is_empty()) {
            Some(v) => req.version(v),
            None => req,
        }
    }

    /// Pin a version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Use an explicit manager instead of detection.
    #[must_use]
    pub const fn manager(mut self, manager: PackageManagerKind) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Append a command to run before the install.
    #[must_use]
    pub fn pre(mut self, cmd: Invocation) -> Self {
        self.pre.push(cmd);
        self
    }

    /// Append a command to run after the install.
    #[must_use]
    pub fn post(mut self, cmd: Invocation) -> Self {
        self.post.push(cmd);
        self
    }

    /// Human-readable label, e.g. `topgrade (brew)` or `git (system)`.
    #[must_use]
    pub fn label(&self) -> String {
        let name = self
            .version
            .as_ref()
            .map_or_else(|| self.package.clone(), |v| format!("{}:{v}", self.package));
        match self.manager {
            Some(kind) => format!("{name} ({kind})"),
            None => format!("{name} (system)"),
        }
    }
}

/// Runs install requests against an [`Executor`].
///
/// Stateless across calls: every [`install`](Self::install) re-detects the
/// system manager (when needed) and rebuilds its queue from scratch.
#[derive(Clone, Copy)]
pub struct InstallSequencer<'a> {
    executor: &'a dyn Executor,
    table: &'a CommandTable,
    dry_run: bool,
}

impl std::fmt::Debug for InstallSequencer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallSequencer")
            .field("executor", &"<dyn Executor>")
            .field("table", &self.table)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl<'a> InstallSequencer<'a> {
    /// Create a sequencer that executes commands.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor, table: &'a CommandTable) -> Self {
        Self {
            executor,
            table,
            dry_run: false,
        }
    }

    /// When `dry_run` is set, [`install`](Self::install) logs the queue
    /// instead of running it.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Whether commands are logged instead of run.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Resolve the manager for `request`, detecting one if none was given.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::NoSupportedManager`] when detection finds
    /// nothing.
    pub fn resolve_manager(
        &self,
        request: &InstallRequest,
    ) -> Result<PackageManagerKind, InstallError> {
        request
            .manager
            .or_else(|| detect::detect(self.executor))
            .ok_or_else(|| InstallError::NoSupportedManager {
                package: request.package.clone(),
            })
    }

    /// Build the full command queue for `request` without running anything.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::NoSupportedManager`] when no manager is
    /// available.
    pub fn plan(&self, request: &InstallRequest) -> Result<Vec<Invocation>, InstallError> {
        let kind = self.resolve_manager(request)?;
        let install =
            self.table
                .install_command(kind, &request.package, request.version.as_deref());

        let mut queue = Vec::with_capacity(request.pre.len() + 1 + request.post.len());
        queue.extend(request.pre.iter().cloned());
        queue.push(install);
        queue.extend(request.post.iter().cloned());
        Ok(queue)
    }

    /// Plan and execute `request`, stopping at the first failing command.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::CommandFailed`] naming the first command that
    /// exited non-zero (or could not be spawned); commands after it are not
    /// run and earlier ones are not undone. Planning errors are returned
    /// before anything runs.
    pub fn install(&self, request: &InstallRequest) -> Result<(), InstallError> {
        let queue = self.plan(request)?;

        if self.dry_run {
            for cmd in &queue {
                tracing::info!(target: crate::logging::DRY_RUN_TARGET, "{cmd}");
            }
            return Ok(());
        }

        run_queue(self.executor, &queue)
    }
}

/// Execute `queue` in order, stopping at the first failure.
///
/// # Errors
///
/// Returns [`InstallError::CommandFailed`] for the first command that exits
/// non-zero or cannot be spawned.
pub fn run_queue(executor: &dyn Executor, queue: &[Invocation]) -> Result<(), InstallError> {
    for (index, cmd) in queue.iter().enumerate() {
        tracing::debug!("running [{}/{}]: {cmd}", index + 1, queue.len());
        let code = match executor.run_status(cmd) {
            Ok(status) if status.success => continue,
            Ok(status) => status.code,
            Err(e) => {
                tracing::debug!("{e:#}");
                None
            }
        };
        return Err(InstallError::CommandFailed {
            index,
            command: cmd.to_string(),
            code,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::FakeExecutor;
    use crate::exec::{MockExecutor, RunStatus};
    use PackageManagerKind as K;

    fn render(queue: &[Invocation]) -> Vec<String> {
        queue.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn default_templates() {
        let table = CommandTable::default();
        let cases = [
            (K::Apt, "sudo apt install -y git"),
            (K::Dnf, "sudo dnf install -y git"),
            (K::Yum, "sudo yum install -y git"),
            (K::Apk, "sudo apk add git"),
            (K::Homebrew, "brew install git"),
            (K::RuntimeVersionManager, "asdf install git"),
            (K::Pip, "pip install git"),
        ];
        for (kind, expected) in cases {
            assert_eq!(table.install_command(kind, "git", None).to_string(), expected);
        }
    }

    #[test]
    fn explicit_manager_runs_exactly_one_command() {
        let table = CommandTable::default();
        for kind in K::ALL {
            let exec = FakeExecutor::new();
            let req = InstallRequest::new("ripgrep").manager(kind);
            InstallSequencer::new(&exec, &table).install(&req).unwrap();
            assert_eq!(
                exec.commands(),
                [table.install_command(kind, "ripgrep", None).to_string()]
            );
            assert!(exec.probes().is_empty(), "explicit manager skips detection");
        }
    }

    #[test]
    fn queue_wraps_install_in_pre_and_post() {
        let exec = FakeExecutor::new();
        let table = CommandTable::default();
        let req = InstallRequest::new("git")
            .manager(K::Apt)
            .pre(Invocation::new("echo").arg("A"))
            .post(Invocation::new("echo").arg("B"));
        InstallSequencer::new(&exec, &table).install(&req).unwrap();
        assert_eq!(
            exec.commands(),
            ["echo A", "sudo apt install -y git", "echo B"]
        );
    }

    #[test]
    fn stops_at_first_failure() {
        let exec = FakeExecutor::new().with_statuses(vec![RunStatus::ok(), RunStatus::failed(100)]);
        let table = CommandTable::default();
        let req = InstallRequest::new("git")
            .manager(K::Apt)
            .pre(Invocation::new("echo").arg("A"))
            .post(Invocation::new("echo").arg("C"));
        let err = InstallSequencer::new(&exec, &table)
            .install(&req)
            .unwrap_err();
        match err {
            InstallError::CommandFailed {
                index,
                command,
                code,
            } => {
                assert_eq!(index, 1);
                assert_eq!(command, "sudo apt install -y git");
                assert_eq!(code, Some(100));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            exec.commands(),
            ["echo A", "sudo apt install -y git"],
            "the post command must not run"
        );
    }

    #[test]
    fn spawn_failure_is_command_failed() {
        let mut exec = MockExecutor::new();
        exec.expect_run_status()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("No such file or directory")));
        let table = CommandTable::default();
        let req = InstallRequest::new("asdf")
            .manager(K::Homebrew)
            .post(Invocation::new("asdf").arg("--version"));
        let err = InstallSequencer::new(&exec, &table)
            .install(&req)
            .unwrap_err();
        assert!(matches!(
            err,
            InstallError::CommandFailed {
                index: 0,
                code: None,
                ..
            }
        ));
    }

    #[test]
    fn no_manager_runs_nothing() {
        let mut exec = MockExecutor::new();
        exec.expect_which().returning(|_| false);
        exec.expect_run_status().never();
        let table = CommandTable::default();
        let req = InstallRequest::new("podman-docker").pre(Invocation::new("echo"));
        let err = InstallSequencer::new(&exec, &table)
            .install(&req)
            .unwrap_err();
        assert!(
            matches!(err, InstallError::NoSupportedManager { ref package } if package == "podman-docker")
        );
    }

    #[test]
    fn detected_manager_is_used_when_unset() {
        let exec = FakeExecutor::new().with_available(&["dnf"]);
        let table = CommandTable::default();
        InstallSequencer::new(&exec, &table)
            .install(&InstallRequest::new("podman-docker"))
            .unwrap();
        assert_eq!(exec.commands(), ["sudo dnf install -y podman-docker"]);
    }

    #[test]
    fn plan_is_idempotent() {
        let exec = FakeExecutor::new().with_available(&["apt"]);
        let table = CommandTable::default();
        let seq = InstallSequencer::new(&exec, &table);
        let req = InstallRequest::new("git").post(Invocation::new("git").arg("--version"));
        seq.install(&req).unwrap();
        seq.install(&req).unwrap();
        let commands = exec.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[..2], commands[2..]);
        assert_eq!(seq.plan(&req).unwrap(), seq.plan(&req).unwrap());
    }

    #[test]
    fn dry_run_executes_nothing() {
        let mut exec = MockExecutor::new();
        exec.expect_run_status().never();
        let table = CommandTable::default();
        let req = InstallRequest::new("topgrade").manager(K::Homebrew);
        InstallSequencer::new(&exec, &table)
            .dry_run(true)
            .install(&req)
            .unwrap();
    }

    #[test]
    fn blank_package_with_explicit_manager_is_still_one_command() {
        let exec = FakeExecutor::new();
        let table = CommandTable::default();
        let queue = InstallSequencer::new(&exec, &table)
            .plan(&InstallRequest::new("").manager(K::Apt))
            .unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].arguments().last().map(String::as_str), Some(""));
    }

    #[test]
    fn package_name_is_substituted_verbatim() {
        let table = CommandTable::default();
        let cmd = table.install_command(K::Apt, "foo; rm -rf ~", None);
        assert_eq!(cmd.arguments().last().unwrap(), "foo; rm -rf ~");
    }

    #[test]
    fn empty_template_falls_back_to_elevated_package() {
        let table = CommandTable::default().with_template(
            K::Apk,
            InstallTemplate {
                args: vec![],
                elevate: true,
            },
        );
        assert_eq!(table.install_command(K::Apk, "curl", None).to_string(), "sudo curl");
    }

    #[test]
    fn empty_template_without_elevation() {
        let table = CommandTable::new(vec![]).with_template(
            K::Apt,
            InstallTemplate {
                args: vec![],
                elevate: true,
            },
        );
        assert_eq!(table.install_command(K::Apt, "git", None).to_string(), "git");
    }

    #[test]
    fn custom_elevation_prefix() {
        let table = CommandTable::new(vec!["doas".to_string()]);
        assert_eq!(
            table.install_command(K::Apk, "curl", None).to_string(),
            "doas apk add curl"
        );
    }

    #[test]
    fn no_elevation_when_prefix_empty() {
        let table = CommandTable::new(vec![]);
        assert_eq!(
            table.install_command(K::Apt, "git", None).to_string(),
            "apt install -y git"
        );
    }

    #[test]
    fn versioned_runtime_install() {
        let exec = FakeExecutor::new();
        let table = CommandTable::default();
        let req = InstallRequest::from_spec("python:3.12.1").manager(K::RuntimeVersionManager);
        let queue = InstallSequencer::new(&exec, &table).plan(&req).unwrap();
        insta::assert_snapshot!(render(&queue).join(" && "), @"asdf install python 3.12.1");
    }

    #[test]
    fn label_mentions_manager() {
        assert_eq!(
            InstallRequest::new("topgrade").manager(K::Homebrew).label(),
            "topgrade (brew)"
        );
        assert_eq!(InstallRequest::from_spec("git:2.43").label(), "git:2.43 (system)");
    }
}
