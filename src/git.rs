//! Global git identity.
use crate::error::GitError;
use crate::exec::{Executor, Invocation};

/// Identity written to the global git config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    /// Name used in commit messages.
    pub name: String,
    /// E-mail used in commit messages.
    pub email: String,
    /// Branch name for new repositories.
    pub default_branch: String,
}

impl GitIdentity {
    /// Identity with the `main` default branch.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            default_branch: "main".to_string(),
        }
    }

    /// The `git config --global` commands for this identity.
    #[must_use]
    pub fn commands(&self) -> Vec<Invocation> {
        [
            ("init.defaultBranch", &self.default_branch),
            ("user.name", &self.name),
            ("user.email", &self.email),
        ]
        .into_iter()
        .map(|(key, value)| {
            Invocation::new("git").args(["config", "--global", key, value.as_str()])
        })
        .collect()
    }
}

/// Write `identity` to the global git config.
///
/// # Errors
///
/// Returns [`GitError::NotInstalled`] if `git` is not on the search path, or
/// [`GitError::ConfigFailed`] for the first failing command.
pub fn configure_identity(executor: &dyn Executor, identity: &GitIdentity) -> Result<(), GitError> {
    if !executor.which("git") {
        return Err(GitError::NotInstalled);
    }
    for cmd in identity.commands() {
        let code = match executor.run_status(&cmd) {
            Ok(status) if status.success => continue,
            Ok(status) => status.code,
            Err(e) => {
                tracing::debug!("{e:#}");
                None
            }
        };
        return Err(GitError::ConfigFailed {
            command: cmd.to_string(),
            code,
        });
    }
    Ok(())
}
