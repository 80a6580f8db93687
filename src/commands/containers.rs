//! `enable-containers`: install a container engine.
use anyhow::Result;

use crate::cli::{ContainerOpts, GlobalOpts};
use crate::config::Config;
use crate::install::InstallRequest;
use crate::logging::Logger;
use crate::recipes;

use super::{CommandSetup, install_all};

/// Run the enable-containers command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or the install fails.
pub fn run(global: &GlobalOpts, opts: &ContainerOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let request = engine_request(opts, &setup.config);
    install_all(&setup.sequencer(), &[request], log);
    super::finish(log)
}

/// The engine named on the command line, else the configured default.
fn engine_request(opts: &ContainerOpts, config: &Config) -> InstallRequest {
    let engine = opts.engine.as_deref().unwrap_or(&config.container_engine);
    recipes::container_engine(engine)
}
