//! `get-cert`: install certbot and request a TLS certificate.
use anyhow::Result;

use crate::cert::{self, CertRequest};
use crate::cli::{CertOpts, GlobalOpts};
use crate::config::CertConfig;
use crate::exec::Executor;
use crate::install::CommandTable;
use crate::logging::{Log, Logger, StepStatus};
use crate::recipes;

use super::{CommandSetup, install_all};

/// Run the get-cert command: install certbot and its DNS plugin, then
/// request the certificate.
///
/// # Errors
///
/// Returns an error if configuration loading fails or any step fails.
pub fn run(global: &GlobalOpts, opts: &CertOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let request = CertRequest {
        domain: opts.domain.clone(),
        email: opts.email.clone(),
        wildcard: !opts.no_wildcard,
    };

    if install_all(&setup.sequencer(), &recipes::certbot(), log) {
        let mut prompt = || {
            dialoguer::Password::new()
                .with_prompt("Linode API key")
                .interact()
                .ok()
        };
        obtain(
            &setup.executor,
            &setup.table,
            &setup.config.cert,
            &request,
            setup.dry_run,
            &mut prompt,
            log,
        );
    }
    super::finish(log)
}

/// Request the certificate and record the result as one step.
pub fn obtain(
    executor: &dyn Executor,
    table: &CommandTable,
    config: &CertConfig,
    request: &CertRequest,
    dry_run: bool,
    prompt: &mut dyn FnMut() -> Option<String>,
    log: &dyn Log,
) {
    let name = format!("certificate {}", request.certbot_domain());
    log.stage(&format!("Requesting {name}"));

    if dry_run {
        if !config.credentials.exists() {
            log.dry_run(&format!(
                "prompt for a Linode API key and write {}",
                config.credentials.display()
            ));
        }
        log.dry_run(&cert::certbot_command(request, config, table).to_string());
        log.record_step(&name, StepStatus::DryRun, None);
        return;
    }

    match cert::request_certificate(executor, table, config, request, prompt) {
        Ok(()) => log.record_step(&name, StepStatus::Ok, None),
        Err(e) => {
            log.error(&e.to_string());
            log.record_step(&name, StepStatus::Failed, Some(&e.to_string()));
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::commands::test_helpers::RecordingLog;
    use crate::exec::RunStatus;
    use crate::exec::test_helpers::FakeExecutor;

    fn request() -> CertRequest {
        CertRequest {
            domain: "example.org".to_string(),
            email: "admin@example.org".to_string(),
            wildcard: true,
        }
    }

    fn config_with_credentials(dir: &tempfile::TempDir) -> CertConfig {
        let config = CertConfig {
            credentials: dir.path().join("linode.ini"),
            propagation_seconds: 120,
        };
        std::fs::write(&config.credentials, cert::credentials_contents("k")).unwrap();
        config
    }

    #[test]
    fn runs_certbot_with_existing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_credentials(&dir);
        let exec = FakeExecutor::new();
        let log = RecordingLog::default();
        obtain(
            &exec,
            &CommandTable::default(),
            &config,
            &request(),
            false,
            &mut || None,
            &log,
        );
        let commands = exec.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].starts_with("sudo certbot certonly --email admin@example.org"));
        assert!(commands[0].ends_with("--domain '*.example.org'"));
        assert_eq!(log.statuses(), [StepStatus::Ok]);
    }

    #[test]
    fn certbot_failure_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_credentials(&dir);
        let exec = FakeExecutor::new().with_statuses(vec![RunStatus::failed(1)]);
        let log = RecordingLog::default();
        obtain(
            &exec,
            &CommandTable::default(),
            &config,
            &request(),
            false,
            &mut || None,
            &log,
        );
        assert_eq!(log.statuses(), [StepStatus::Failed]);
        assert!(log.lines().iter().any(|l| l.starts_with("error:")));
    }

    #[test]
    fn dry_run_does_not_prompt_or_run() {
        let config = CertConfig {
            credentials: "/nonexistent/devkit/linode.ini".into(),
            propagation_seconds: 120,
        };
        let exec = FakeExecutor::new();
        let log = RecordingLog::default();
        let mut prompted = false;
        obtain(
            &exec,
            &CommandTable::default(),
            &config,
            &request(),
            true,
            &mut || {
                prompted = true;
                None
            },
            &log,
        );
        assert!(!prompted);
        assert!(exec.commands().is_empty());
        let lines = log.lines();
        assert!(lines.iter().any(|l| l.contains("prompt for a Linode API key")));
        assert!(lines.iter().any(|l| l.starts_with("dry run: sudo certbot")));
        assert_eq!(log.statuses(), [StepStatus::DryRun]);
    }
}
