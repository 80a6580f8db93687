//! `install`: install one package, optionally through an explicit manager.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, InstallOpts};
use crate::exec::Invocation;
use crate::install::InstallRequest;
use crate::logging::Logger;
use crate::manager::PackageManagerKind;
use crate::recipes;

use super::{CommandSetup, install_all};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if a `--pre`/`--post` command cannot be parsed,
/// configuration loading fails, or the install fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Logger) -> Result<()> {
    let request = build_request(opts)?;
    let setup = CommandSetup::init(global, log)?;
    install_all(&setup.sequencer(), &[request], log);
    super::finish(log)
}

/// Turn the command-line options into an install request.
///
/// asdf installs get the plugin and default-version hooks; `--pre` and
/// `--post` commands are appended after them.
///
/// # Errors
///
/// Returns an error if the package name is blank or a hook command line
/// cannot be split into words.
pub fn build_request(opts: &InstallOpts) -> Result<InstallRequest> {
    let spec = InstallRequest::from_spec(&opts.package);
    anyhow::ensure!(
        !spec.package.trim().is_empty(),
        "package name must not be empty: {:?}",
        opts.package
    );
    let mut request = match opts.manager {
        Some(PackageManagerKind::RuntimeVersionManager) => {
            recipes::runtime(&spec.package, spec.version.as_deref())
        }
        Some(kind) => spec.manager(kind),
        None => spec,
    };
    for line in &opts.pre {
        request = request.pre(parse_hook(line)?);
    }
    for line in &opts.post {
        request = request.post(parse_hook(line)?);
    }
    Ok(request)
}

fn parse_hook(line: &str) -> Result<Invocation> {
    Invocation::parse(line).with_context(|| format!("invalid hook command: {line:?}"))
}
