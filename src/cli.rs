//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::manager::PackageManagerKind;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "devkit",
    about = "Provision a developer machine: bootstrap tools, update, certificates",
    version = crate::VERSION
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Print the commands that would run without running them
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/devkit/config.toml)
    #[arg(short, long, global = true, env = "DEVKIT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install Homebrew, topgrade and asdf, then update the system
    Setup(SetupOpts),
    /// Update the system and installed tools with topgrade
    Update,
    /// Install a container engine through the system package manager
    EnableContainers(ContainerOpts),
    /// Install a single package
    Install(InstallOpts),
    /// Obtain a TLS certificate through certbot and Linode DNS
    GetCert(CertOpts),
    /// Show the detected system package manager
    Detect(DetectOpts),
    /// Generate shell completions
    Completions(CompletionsOpts),
}

impl Command {
    /// Subcommand name, used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::Update => "update",
            Self::EnableContainers(_) => "enable-containers",
            Self::Install(_) => "install",
            Self::GetCert(_) => "get-cert",
            Self::Detect(_) => "detect",
            Self::Completions(_) => "completions",
        }
    }
}

/// Options for `setup`.
#[derive(Args, Debug, Clone, Default)]
pub struct SetupOpts {
    /// Also install development tools (git, make)
    #[arg(long)]
    pub dev: bool,

    /// Name for the global git identity
    #[arg(long, requires = "git_email")]
    pub git_name: Option<String>,

    /// E-mail for the global git identity
    #[arg(long, requires = "git_name")]
    pub git_email: Option<String>,
}

/// Options for `enable-containers`.
#[derive(Args, Debug, Clone, Default)]
pub struct ContainerOpts {
    /// Engine package (default: podman-docker, or `container_engine` from the config)
    pub engine: Option<String>,
}

/// Options for `install`.
#[derive(Args, Debug, Clone)]
pub struct InstallOpts {
    /// Package to install, optionally pinned as `name:version`
    pub package: String,

    /// Package manager (brew, asdf, pip, apt, dnf, yum, apk); detected if omitted
    #[arg(short, long)]
    pub manager: Option<PackageManagerKind>,

    /// Command to run before the install (repeatable)
    #[arg(long, value_name = "COMMAND")]
    pub pre: Vec<String>,

    /// Command to run after the install (repeatable)
    #[arg(long, value_name = "COMMAND")]
    pub post: Vec<String>,
}

/// Options for `get-cert`.
#[derive(Args, Debug, Clone)]
pub struct CertOpts {
    /// Domain to certify
    pub domain: String,

    /// Registration and recovery e-mail
    pub email: String,

    /// Certify the domain itself instead of `*.domain`
    #[arg(long)]
    pub no_wildcard: bool,
}

/// Options for `detect`.
#[derive(Args, Debug, Clone, Default)]
pub struct DetectOpts {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for `completions`.
#[derive(Args, Debug, Clone)]
pub struct CompletionsOpts {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_setup_dev() {
        let cli = Cli::parse_from(["devkit", "setup", "--dev"]);
        let Command::Setup(opts) = cli.command else {
            panic!("expected setup");
        };
        assert!(opts.dev);
        assert!(opts.git_name.is_none());
    }

    #[test]
    fn git_name_requires_email() {
        let err = Cli::try_parse_from(["devkit", "setup", "--git-name", "Ada"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        let cli = Cli::try_parse_from([
            "devkit",
            "setup",
            "--git-name",
            "Ada",
            "--git-email",
            "ada@example.com",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Setup(SetupOpts { git_name: Some(_), .. })));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["devkit", "update", "-d", "-v", "-c", "/tmp/devkit.toml"]);
        assert!(cli.global.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/devkit.toml")));
        assert_eq!(cli.command.name(), "update");
    }

    #[test]
    fn parse_install_with_manager_and_hooks() {
        let cli = Cli::parse_from([
            "devkit",
            "install",
            "python:3.12.1",
            "--manager",
            "asdf",
            "--pre",
            "echo before",
            "--post",
            "echo after",
            "--post",
            "asdf reshim",
        ]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.package, "python:3.12.1");
        assert_eq!(opts.manager, Some(PackageManagerKind::RuntimeVersionManager));
        assert_eq!(opts.pre, ["echo before"]);
        assert_eq!(opts.post, ["echo after", "asdf reshim"]);
    }

    #[test]
    fn unknown_manager_is_rejected() {
        assert!(Cli::try_parse_from(["devkit", "install", "git", "--manager", "pacman"]).is_err());
    }

    #[test]
    fn parse_enable_containers_default() {
        let cli = Cli::parse_from(["devkit", "enable-containers"]);
        assert!(matches!(
            cli.command,
            Command::EnableContainers(ContainerOpts { engine: None })
        ));
        let cli = Cli::parse_from(["devkit", "enable-containers", "docker.io"]);
        assert!(matches!(
            cli.command,
            Command::EnableContainers(ContainerOpts { engine: Some(ref e) }) if e == "docker.io"
        ));
    }

    #[test]
    fn parse_get_cert() {
        let cli = Cli::parse_from(["devkit", "get-cert", "example.com", "ops@example.com"]);
        let Command::GetCert(opts) = cli.command else {
            panic!("expected get-cert");
        };
        assert_eq!(opts.domain, "example.com");
        assert!(!opts.no_wildcard);
    }

    #[test]
    fn get_cert_requires_email() {
        assert!(Cli::try_parse_from(["devkit", "get-cert", "example.com"]).is_err());
    }

    #[test]
    fn parse_detect_json() {
        let cli = Cli::parse_from(["devkit", "detect", "--json"]);
        assert!(matches!(cli.command, Command::Detect(DetectOpts { json: true })));
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["devkit", "completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Command::Completions(CompletionsOpts {
                shell: clap_complete::Shell::Zsh
            })
        ));
    }
}
