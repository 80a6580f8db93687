//! `completions`: shell completion scripts.
use std::io::Write;

use clap::CommandFactory as _;

use crate::cli::{Cli, CompletionsOpts};

/// Write completions for the requested shell to stdout.
pub fn run(opts: &CompletionsOpts) {
    write(opts.shell, &mut std::io::stdout());
}

/// Write completions for `shell` to `out`.
pub fn write(shell: clap_complete::Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "devkit", out);
}
