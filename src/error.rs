//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors (e.g. [`InstallError`],
//! [`ConfigError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DevkitError
//! ├── Install(InstallError) - manager detection and command queue failures
//! ├── Config(ConfigError)   - config file loading and validation
//! ├── Cert(CertError)       - credential file and certbot failures
//! └── Git(GitError)         - git identity configuration
//! ```
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the provisioning engine.
#[derive(Error, Debug)]
pub enum DevkitError {
    /// Package installation error.
    #[error("Install error: {0}")]
    Install(#[from] InstallError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Certificate issuance error.
    #[error("Certificate error: {0}")]
    Cert(#[from] CertError),

    /// Git configuration error.
    #[error("Git error: {0}")]
    Git(#[from] GitError),
}

/// Errors produced by the install sequencer.
#[derive(Error, Debug)]
pub enum InstallError {
    /// No manager was supplied and none of the system managers is on `PATH`.
    ///
    /// Non-fatal: the caller should tell the user to install the package by
    /// hand.
    #[error("no supported package manager found to install '{package}'")]
    NoSupportedManager {
        /// The package that could not be installed.
        package: String,
    },

    /// A command in the queue failed; later commands were not run.
    #[error("command #{index} failed{}: {command}", exit_suffix(.code))]
    CommandFailed {
        /// Zero-based position of the failing command in the queue.
        index: usize,
        /// The failing command line.
        command: String,
        /// Exit code, or `None` if the process could not be spawned or was
        /// killed by a signal.
        code: Option<i32>,
    },
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn exit_suffix(code: &Option<i32>) -> String {
    code.map_or_else(String::new, |c| format!(" (exit {c})"))
}

/// Errors from splitting a textual command line into an invocation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandParseError {
    /// The line contained no words.
    #[error("empty command")]
    Empty,

    /// The line could not be split (e.g. unbalanced quotes).
    #[error("cannot parse command '{line}': {message}")]
    Malformed {
        /// The offending command line.
        line: String,
        /// Parser message.
        message: String,
    },
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading the config file.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or does not match the schema.
    #[error("Invalid TOML in {}: {source}", .path.display())]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// A `[managers.<name>]` table names an unsupported package manager.
    #[error("Unknown package manager '{0}' in [managers]")]
    UnknownManager(String),

    /// The `elevation` setting cannot be split into words.
    #[error("Invalid elevation command: {0}")]
    InvalidElevation(#[source] CommandParseError),
}

/// Errors that arise while requesting a TLS certificate.
#[derive(Error, Debug)]
pub enum CertError {
    /// The API key prompt failed or produced an empty key.
    #[error("No API key provided for {}", .path.display())]
    MissingApiKey {
        /// Credential file that would have been written.
        path: PathBuf,
    },

    /// Writing the credential file failed.
    #[error("Failed to write credentials to {}: {reason}", .path.display())]
    Credentials {
        /// Destination credential file.
        path: PathBuf,
        /// Human-readable reason.
        reason: String,
    },

    /// certbot exited non-zero.
    #[error("certbot failed for {domain}{}", exit_suffix(.code))]
    Certbot {
        /// Domain the certificate was requested for.
        domain: String,
        /// Exit code, if any.
        code: Option<i32>,
    },

    /// A command could not be spawned.
    #[error("Failed to run {command}: {reason}")]
    Spawn {
        /// The command line.
        command: String,
        /// Underlying error message.
        reason: String,
    },
}

/// Errors that arise while configuring git.
#[derive(Error, Debug)]
pub enum GitError {
    /// `git` is not on the search path.
    #[error("git is not available at runtime")]
    NotInstalled,

    /// A `git config` command failed.
    #[error("'{command}' failed{}", exit_suffix(.code))]
    ConfigFailed {
        /// The failing command line.
        command: String,
        /// Exit code, if any.
        code: Option<i32>,
    },
}
