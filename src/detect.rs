//! System package manager detection.
use crate::exec::Executor;
use crate::manager::PackageManagerKind;

/// Probe the host for a system package manager.
///
/// Checks [`PackageManagerKind::SYSTEM_PRIORITY`] in order and returns the
/// first manager whose executable resolves through `probe`. Nothing is
/// cached; every call re-probes so the answer tracks the current host.
#[must_use]
pub fn detect(probe: &dyn Executor) -> Option<PackageManagerKind> {
    let found = PackageManagerKind::SYSTEM_PRIORITY
        .into_iter()
        .find(|kind| probe.which(kind.executable()));
    match found {
        Some(kind) => tracing::debug!("detected system package manager: {kind}"),
        None => tracing::debug!("no system package manager found on PATH"),
    }
    found
}
