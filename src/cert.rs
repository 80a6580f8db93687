//! TLS certificates via certbot and the Linode DNS plugin.
use std::io::Write as _;
use std::path::Path;

use crate::config::CertConfig;
use crate::error::CertError;
use crate::exec::{Executor, Invocation};
use crate::install::CommandTable;

/// Linode API version written to the credential file.
const LINODE_API_VERSION: u32 = 4;

/// A certificate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertRequest {
    /// Base domain, e.g. `example.com`.
    pub domain: String,
    /// Registration and recovery e-mail.
    pub email: String,
    /// Request `*.domain` instead of `domain`.
    pub wildcard: bool,
}

impl CertRequest {
    /// The domain argument passed to certbot.
    #[must_use]
    pub fn certbot_domain(&self) -> String {
        if self.wildcard {
            format!("*.{}", self.domain)
        } else {
            self.domain.clone()
        }
    }
}

/// Contents of the Linode DNS credential file.
#[must_use]
pub fn credentials_contents(api_key: &str) -> String {
    format!(
        "dns_linode_key = {}\ndns_linode_version = {LINODE_API_VERSION}\n",
        api_key.trim()
    )
}

/// The certbot command for `request`.
#[must_use]
pub fn certbot_command(
    request: &CertRequest,
    config: &CertConfig,
    table: &CommandTable,
) -> Invocation {
    let cmd = Invocation::new("certbot")
        .args(["certonly", "--email", request.email.as_str()])
        .args(["--agree-tos", "--non-interactive", "--dns-linode"])
        .arg("--dns-linode-credentials")
        .arg(config.credentials.to_string_lossy())
        .arg("--dns-linode-propagation-seconds")
        .arg(config.propagation_seconds.to_string())
        .arg("--domain")
        .arg(request.certbot_domain());
    table.elevate(cmd)
}

/// Make sure the credential file exists, prompting for an API key if not.
///
/// The key is written to a private temporary file and moved into place
/// with `install -D -m 600` behind the elevation prefix, since the target
/// directory is normally root-owned. Returns `true` if the file was written.
///
/// # Errors
///
/// Returns an error if the prompt yields no key or the file cannot be
/// written.
pub fn ensure_credentials(
    executor: &dyn Executor,
    table: &CommandTable,
    path: &Path,
    prompt: &mut dyn FnMut() -> Option<String>,
) -> Result<bool, CertError> {
    if path.exists() {
        tracing::debug!("using existing credentials at {}", path.display());
        return Ok(false);
    }

    tracing::info!("Unable to find Linode credentials at {}", path.display());
    let api_key = prompt()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| CertError::MissingApiKey {
            path: path.to_path_buf(),
        })?;

    let credentials_error = |reason: String| CertError::Credentials {
        path: path.to_path_buf(),
        reason,
    };

    let mut staged = tempfile::NamedTempFile::new().map_err(|e| credentials_error(e.to_string()))?;
    staged
        .write_all(credentials_contents(&api_key).as_bytes())
        .and_then(|()| staged.flush())
        .map_err(|e| credentials_error(e.to_string()))?;

    let install = table.elevate(
        Invocation::new("install")
            .args(["-D", "-m", "600"])
            .arg(staged.path().to_string_lossy())
            .arg(path.to_string_lossy()),
    );
    let status = executor
        .run_status(&install)
        .map_err(|e| credentials_error(format!("{e:#}")))?;
    if !status.success {
        return Err(credentials_error(format!("'{install}' failed")));
    }
    Ok(true)
}

/// Request a certificate, creating the credential file first if needed.
///
/// # Errors
///
/// Returns an error if the credentials cannot be prepared or certbot fails.
pub fn request_certificate(
    executor: &dyn Executor,
    table: &CommandTable,
    config: &CertConfig,
    request: &CertRequest,
    prompt: &mut dyn FnMut() -> Option<String>,
) -> Result<(), CertError> {
    ensure_credentials(executor, table, &config.credentials, prompt)?;

    let cmd = certbot_command(request, config, table);
    tracing::debug!("running: {cmd}");
    let status = executor.run_status(&cmd).map_err(|e| CertError::Spawn {
        command: cmd.to_string(),
        reason: format!("{e:#}"),
    })?;
    if status.success {
        Ok(())
    } else {
        Err(CertError::Certbot {
            domain: request.domain.clone(),
            code: status.code,
        })
    }
}
