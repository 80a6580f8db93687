//! Supported package managers.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Supported package managers.
///
/// System managers ([`Apt`](Self::Apt), [`Dnf`](Self::Dnf),
/// [`Yum`](Self::Yum), [`Apk`](Self::Apk)) can be auto-detected; the others
/// are only used when a caller asks for them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerKind {
    /// Homebrew (`brew`).
    #[serde(rename = "brew")]
    Homebrew,
    /// asdf runtime version manager (`asdf`).
    #[serde(rename = "asdf")]
    RuntimeVersionManager,
    /// Python packages (`pip`).
    Pip,
    /// Debian/Ubuntu (`apt`).
    Apt,
    /// Fedora/RHEL 8+ (`dnf`).
    Dnf,
    /// Older RHEL/CentOS (`yum`).
    Yum,
    /// Alpine (`apk`).
    Apk,
}

impl PackageManagerKind {
    /// Every supported manager.
    pub const ALL: [Self; 7] = [
        Self::Homebrew,
        Self::RuntimeVersionManager,
        Self::Pip,
        Self::Apt,
        Self::Dnf,
        Self::Yum,
        Self::Apk,
    ];

    /// System managers in detection priority order.
    pub const SYSTEM_PRIORITY: [Self; 4] = [Self::Apt, Self::Dnf, Self::Yum, Self::Apk];

    /// Name of the manager's executable.
    #[must_use]
    pub const fn executable(self) -> &'static str {
        match self {
            Self::Homebrew => "brew",
            Self::RuntimeVersionManager => "asdf",
            Self::Pip => "pip",
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Apk => "apk",
        }
    }

    /// Whether this is a host-level manager eligible for auto-detection.
    #[must_use]
    pub const fn is_system(self) -> bool {
        matches!(self, Self::Apt | Self::Dnf | Self::Yum | Self::Apk)
    }

    /// Arguments placed between the executable and the package name.
    #[must_use]
    pub const fn default_install_args(self) -> &'static [&'static str] {
        match self {
            Self::Apt | Self::Dnf | Self::Yum => &["install", "-y"],
            Self::Apk => &["add"],
            Self::Homebrew | Self::RuntimeVersionManager | Self::Pip => &["install"],
        }
    }

    /// Whether the install command runs behind the elevation prefix.
    #[must_use]
    pub const fn elevates_by_default(self) -> bool {
        self.is_system()
    }

    /// Render a package (and optional version) as install arguments.
    ///
    /// asdf takes the version as a separate word; the other managers use
    /// their own `name<sep>version` syntax.
    #[must_use]
    pub fn package_args(self, package: &str, version: Option<&str>) -> Vec<String> {
        let Some(version) = version else {
            return vec![package.to_string()];
        };
        match self {
            Self::RuntimeVersionManager => vec![package.to_string(), version.to_string()],
            Self::Apt | Self::Apk => vec![format!("{package}={version}")],
            Self::Dnf | Self::Yum => vec![format!("{package}-{version}")],
            Self::Pip => vec![format!("{package}=={version}")],
            Self::Homebrew => vec![format!("{package}@{version}")],
        }
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

/// Error returned when parsing an unknown manager name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown package manager '{0}' (expected one of: brew, asdf, pip, apt, dnf, yum, apk)")]
pub struct UnknownManager(pub String);

impl FromStr for PackageManagerKind {
    type Err = UnknownManager;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.executable() == s)
            .ok_or_else(|| UnknownManager(s.to_string()))
    }
}
