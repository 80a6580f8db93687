//! The fixed set of tool installs the provisioning commands sequence.
//!
//! Each recipe is a plain [`InstallRequest`] or [`Invocation`]; nothing here
//! runs commands.
use crate::exec::Invocation;
use crate::install::InstallRequest;
use crate::manager::PackageManagerKind;

/// Official Homebrew install script.
pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// curl, needed by the Homebrew installer.
#[must_use]
pub fn curl() -> InstallRequest {
    InstallRequest::new("curl")
}

/// Run the official Homebrew installer unattended unless `brew` already
/// resolves.
#[must_use]
pub fn homebrew_bootstrap() -> Invocation {
    Invocation::shell(format!(
        "command -v brew >/dev/null 2>&1 || NONINTERACTIVE=1 /bin/bash -c \"$(curl -fsSL {HOMEBREW_INSTALL_URL})\""
    ))
}

/// topgrade, the system updater.
#[must_use]
pub fn topgrade() -> InstallRequest {
    InstallRequest::new("topgrade").manager(PackageManagerKind::Homebrew)
}

/// asdf, the language runtime manager.
#[must_use]
pub fn asdf() -> InstallRequest {
    InstallRequest::new("asdf").manager(PackageManagerKind::Homebrew)
}

/// The tools `setup` installs through Homebrew once it is bootstrapped.
#[must_use]
pub fn brew_tools() -> Vec<InstallRequest> {
    vec![topgrade(), asdf()]
}

/// Extra tooling installed by `setup --dev`.
#[must_use]
pub fn dev_tools() -> Vec<InstallRequest> {
    vec![InstallRequest::new("git"), InstallRequest::new("make")]
}

/// A container engine installed through the system manager.
#[must_use]
pub fn container_engine(engine: &str) -> InstallRequest {
    InstallRequest::new(engine)
}

/// certbot from the system manager plus the Linode DNS plugin from pip.
#[must_use]
pub fn certbot() -> Vec<InstallRequest> {
    vec![
        InstallRequest::new("certbot"),
        InstallRequest::new("certbot-dns-linode").manager(PackageManagerKind::Pip),
    ]
}

/// A language runtime through asdf.
///
/// The asdf plugin is added first, but only when it is missing, since
/// `asdf plugin add` fails for an existing plugin. A pinned version becomes
/// the user-wide default afterwards (`asdf set -u`, asdf 0.16 and later).
#[must_use]
pub fn runtime(name: &str, version: Option<&str>) -> InstallRequest {
    let plugin = shell_words::quote(name);
    let add_plugin = format!(
        "asdf plugin list 2>/dev/null | grep -qx {plugin} || asdf plugin add {plugin}"
    );
    let mut request = InstallRequest::new(name)
        .manager(PackageManagerKind::RuntimeVersionManager)
        .pre(Invocation::shell(add_plugin));
    if let Some(version) = version {
        request = request
            .version(version)
            .post(Invocation::new("asdf").args(["set", "-u", name, version]));
    }
    request
}

/// The system update command run by `update`.
#[must_use]
pub fn update_command() -> Invocation {
    Invocation::new("topgrade")
}
