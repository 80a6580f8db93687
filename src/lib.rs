//! Developer-machine provisioning.
//!
//! The core is a package-manager abstraction and command-sequencing engine:
//!
//! - **[`detect`]**: find the system package manager (apt, dnf, yum, apk)
//! - **[`install`]**: turn an install request into an ordered command queue
//!   and run it, stopping at the first failure
//! - **[`recipes`]**: the fixed tool installs (Homebrew, topgrade, asdf,
//!   certbot) expressed as install requests
//! - **[`commands`]**: subcommand orchestration on top of the above
//!
//! All process execution goes through the [`exec::Executor`] trait.
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cert;
pub mod cli;
pub mod commands;
pub mod config;
pub mod detect;
pub mod error;
pub mod exec;
pub mod git;
pub mod install;
pub mod logging;
pub mod manager;
pub mod recipes;

/// Version string: `DEVKIT_VERSION` from the build, else the crate version.
pub const VERSION: &str = match option_env!("DEVKIT_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
