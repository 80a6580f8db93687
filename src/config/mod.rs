//! User configuration (`config.toml`).
//!
//! Every key is optional; a missing file means built-in defaults.
//!
//! ```toml
//! elevation = "sudo"
//! container_engine = "podman-docker"
//! search_paths = ["/home/linuxbrew/.linuxbrew/bin"]
//!
//! [managers.apt]
//! args = ["install", "-y", "--no-install-recommends"]
//!
//! [cert]
//! credentials = "/etc/letsencrypt/linode.ini"
//! propagation_seconds = 120
//! ```
pub mod toml_loader;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::exec::Invocation;
use crate::install::{CommandTable, DEFAULT_ELEVATION, InstallTemplate};
use crate::manager::PackageManagerKind;

/// Container engine installed by `enable-containers` when none is given.
pub const DEFAULT_CONTAINER_ENGINE: &str = "podman-docker";

/// Default Linode credential file read by certbot.
pub const DEFAULT_CREDENTIALS: &str = "/etc/letsencrypt/linode.ini";

/// Directories where a fresh Homebrew install puts `brew`.
pub const HOMEBREW_BIN_DIRS: [&str; 3] = [
    "/home/linuxbrew/.linuxbrew/bin",
    "/opt/homebrew/bin",
    "/usr/local/bin",
];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Privilege-escalation command line; empty disables elevation.
    pub elevation: String,
    /// Engine installed by `enable-containers` without an argument.
    pub container_engine: String,
    /// Extra directories searched for programs (appended to `PATH`).
    pub search_paths: Vec<PathBuf>,
    /// Per-manager template overrides keyed by executable name.
    pub managers: BTreeMap<String, ManagerOverride>,
    /// Certificate settings.
    pub cert: CertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            elevation: DEFAULT_ELEVATION.to_string(),
            container_engine: DEFAULT_CONTAINER_ENGINE.to_string(),
            search_paths: HOMEBREW_BIN_DIRS.into_iter().map(PathBuf::from).collect(),
            managers: BTreeMap::new(),
            cert: CertConfig::default(),
        }
    }
}

/// Override of one manager's install template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerOverride {
    /// Arguments between the executable and the package name.
    pub args: Vec<String>,
    /// Whether to elevate; defaults to the manager's built-in behaviour.
    #[serde(default)]
    pub elevate: Option<bool>,
}

/// Settings for `get-cert`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CertConfig {
    /// Linode DNS credential file.
    pub credentials: PathBuf,
    /// Seconds certbot waits for DNS propagation.
    pub propagation_seconds: u32,
}

impl Default for CertConfig {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from(DEFAULT_CREDENTIALS),
            propagation_seconds: 120,
        }
    }
}

impl Config {
    /// Load configuration from `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }

    /// Build the install command table described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `elevation` cannot be split into words or a
    /// `[managers]` key names an unknown manager.
    pub fn command_table(&self) -> Result<CommandTable, ConfigError> {
        let elevation = if self.elevation.trim().is_empty() {
            Vec::new()
        } else {
            let cmd = Invocation::parse(&self.elevation).map_err(ConfigError::InvalidElevation)?;
            std::iter::once(cmd.program().to_string())
                .chain(cmd.arguments().iter().cloned())
                .collect()
        };

        let mut table = CommandTable::new(elevation);
        for (name, over) in &self.managers {
            let kind: PackageManagerKind = name
                .parse()
                .map_err(|_| ConfigError::UnknownManager(name.clone()))?;
            let template = InstallTemplate {
                args: over.args.clone(),
                elevate: over.elevate.unwrap_or(kind.elevates_by_default()),
            };
            table = table.with_template(kind, template);
        }
        Ok(table)
    }
}

/// Resolve the config file location.
///
/// Precedence: explicit path (CLI flag or `DEVKIT_CONFIG`, both handled by
/// the caller), then `$XDG_CONFIG_HOME/devkit/config.toml`, then
/// `$HOME/.config/devkit/config.toml`. Returns `None` when neither variable
/// is set.
#[must_use]
pub fn default_path(xdg_config_home: Option<&str>, home: Option<&str>) -> Option<PathBuf> {
    let base = match (xdg_config_home.filter(|s| !s.is_empty()), home) {
        (Some(xdg), _) => PathBuf::from(xdg),
        (None, Some(home)) => Path::new(home).join(".config"),
        (None, None) => return None,
    };
    Some(base.join("devkit").join("config.toml"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(parse(""), Config::default());
    }

    #[test]
    fn default_table_uses_sudo() {
        let table = Config::default().command_table().unwrap();
        assert_eq!(table.elevation(), ["sudo"]);
    }

    #[test]
    fn empty_elevation_disables_prefix() {
        let table = parse("elevation = \"\"").command_table().unwrap();
        assert!(table.elevation().is_empty());
        assert_eq!(
            table
                .install_command(PackageManagerKind::Apt, "git", None)
                .to_string(),
            "apt install -y git"
        );
    }

    #[test]
    fn multi_word_elevation() {
        let table = parse("elevation = \"sudo -E\"").command_table().unwrap();
        assert_eq!(table.elevation(), ["sudo", "-E"]);
    }

    #[test]
    fn unbalanced_elevation_is_rejected() {
        let err = parse("elevation = \"sudo '\"").command_table().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidElevation(_)));
    }

    #[test]
    fn manager_override_replaces_template() {
        let config = parse(
            "[managers.apt]\nargs = [\"install\", \"-y\", \"--no-install-recommends\"]\n",
        );
        let table = config.command_table().unwrap();
        assert_eq!(
            table
                .install_command(PackageManagerKind::Apt, "git", None)
                .to_string(),
            "sudo apt install -y --no-install-recommends git"
        );
    }

    #[test]
    fn manager_override_can_toggle_elevation() {
        let config = parse("[managers.pip]\nargs = [\"install\"]\nelevate = true\n");
        let table = config.command_table().unwrap();
        assert_eq!(
            table
                .install_command(PackageManagerKind::Pip, "black", None)
                .to_string(),
            "sudo pip install black"
        );
    }

    #[test]
    fn unknown_manager_is_rejected() {
        let config = parse("[managers.pacman]\nargs = [\"-S\"]\n");
        let err = config.command_table().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownManager(ref name) if name == "pacman"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(toml::from_str::<Config>("elevate = \"sudo\"").is_err());
    }

    #[test]
    fn cert_settings() {
        let config = parse("[cert]\ncredentials = \"/tmp/linode.ini\"\n");
        assert_eq!(config.cert.credentials, PathBuf::from("/tmp/linode.ini"));
        assert_eq!(config.cert.propagation_seconds, 120);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "container_engine = \"docker.io\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.container_engine, "docker.io");
        assert_eq!(config.elevation, "sudo");
    }

    #[test]
    fn default_path_prefers_xdg() {
        assert_eq!(
            default_path(Some("/xdg"), Some("/home/u")),
            Some(PathBuf::from("/xdg/devkit/config.toml"))
        );
    }

    #[test]
    fn default_path_falls_back_to_home() {
        assert_eq!(
            default_path(Some(""), Some("/home/u")),
            Some(PathBuf::from("/home/u/.config/devkit/config.toml"))
        );
        assert_eq!(default_path(None, None), None);
    }
}
