//! `detect`: report the system package manager.
use anyhow::Result;

use crate::cli::{DetectOpts, GlobalOpts};
use crate::detect::detect;
use crate::logging::{Log, Logger};
use crate::manager::PackageManagerKind;

use super::CommandSetup;

/// Run the detect command.
///
/// Prints the detected manager's executable name, or a JSON object with
/// `--json`.
///
/// # Errors
///
/// Returns an error if configuration loading fails, or, without `--json`,
/// if no supported manager is found.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &DetectOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let found = detect(&setup.executor);

    if opts.json {
        println!("{}", render_json(found)?);
        return Ok(());
    }
    match found {
        Some(kind) => {
            println!("{kind}");
            Ok(())
        }
        None => {
            report_missing(log);
            anyhow::bail!("no supported package manager found")
        }
    }
}

/// `{"manager": "<name>"}`, or `{"manager": null}` when nothing was found.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(found: Option<PackageManagerKind>) -> serde_json::Result<String> {
    serde_json::to_string(&serde_json::json!({ "manager": found }))
}

fn report_missing(log: &dyn Log) {
    let looked_for = PackageManagerKind::SYSTEM_PRIORITY
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    log.warn(&format!(
        "none of {looked_for} is available; install packages manually"
    ));
}
