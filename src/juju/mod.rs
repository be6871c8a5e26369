//! Client for the `juju` command line tool.
//!
//! Everything the harness needs from the deployment engine goes through the
//! [`JujuClient`] trait so the bootstrapper and the checks can be exercised
//! against a scripted [`crate::subprocess::MockProcessRunner`].

pub mod status;

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::JujuSettings;
use crate::subprocess::{
    join_streams, ProcessCommandBuilder, ProcessError, ProcessOutput, ProcessRunner,
};

pub use status::{ModelStatus, UnitStatus};

/// Extra time the local `juju` process gets beyond `--timeout` before it is killed
const RUN_TIMEOUT_GRACE: Duration = Duration::from_secs(30);

/// Result of a command run on a unit: combined stdout/stderr and exit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutput {
    pub output: String,
    pub exit_code: i32,
}

impl RemoteOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[async_trait]
pub trait JujuClient: Send + Sync {
    async fn deploy(&self, bundle: &Path) -> Result<(), ProcessError>;
    async fn status(&self) -> Result<ModelStatus, ProcessError>;
    async fn run(&self, unit: &str, command: &str) -> Result<RemoteOutput, ProcessError>;
    async fn remove_application(&self, application: &str) -> Result<(), ProcessError>;
}

pub struct JujuCli {
    runner: Arc<dyn ProcessRunner>,
    settings: JujuSettings,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    #[serde(rename = "UnitId", default)]
    unit_id: String,
    #[serde(rename = "Stdout", default)]
    stdout: String,
    #[serde(rename = "Stderr", default)]
    stderr: String,
    #[serde(rename = "ReturnCode", default)]
    return_code: i32,
}

/// Parse the JSON document printed by `juju run --format=json`.
/// Only the entry reported for `unit` counts.
fn parse_run_output(unit: &str, stdout: &str) -> Option<RemoteOutput> {
    let results: Vec<RunResult> = serde_json::from_str(stdout.trim()).ok()?;
    let result = results.iter().find(|r| r.unit_id == unit)?;

    Some(RemoteOutput {
        output: join_streams(&result.stdout, &result.stderr),
        exit_code: result.return_code,
    })
}

impl JujuCli {
    pub fn new(runner: Arc<dyn ProcessRunner>, settings: JujuSettings) -> Self {
        Self { runner, settings }
    }

    fn command(&self) -> ProcessCommandBuilder {
        let builder = ProcessCommandBuilder::new(&self.settings.binary);
        match &self.settings.model {
            Some(model) => builder.env("JUJU_MODEL", model),
            None => builder,
        }
    }

    async fn checked(&self, builder: ProcessCommandBuilder) -> Result<ProcessOutput, ProcessError> {
        let command = builder.build();
        let output = self.runner.run(command.clone()).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(ProcessError::failed(&command, &output))
        }
    }
}

#[async_trait]
impl JujuClient for JujuCli {
    async fn deploy(&self, bundle: &Path) -> Result<(), ProcessError> {
        let output = self
            .checked(
                self.command()
                    .arg("deploy")
                    .arg(bundle.to_string_lossy().as_ref()),
            )
            .await?;
        tracing::debug!("juju deploy: {}", output.combined());
        Ok(())
    }

    async fn status(&self) -> Result<ModelStatus, ProcessError> {
        let output = self
            .checked(self.command().args(["status", "--format=json"]))
            .await?;

        serde_json::from_str(&output.stdout).map_err(|e| ProcessError::InvalidOutput {
            command: "juju status --format=json".to_string(),
            message: e.to_string(),
        })
    }

    async fn run(&self, unit: &str, command: &str) -> Result<RemoteOutput, ProcessError> {
        let start = Instant::now();

        let mut builder = self.command().args(["run", "--format=json", "--unit", unit]);
        if let Some(timeout) = self.settings.run_timeout {
            builder = builder
                .arg("--timeout")
                .arg(&format!("{}s", timeout.as_secs()))
                .timeout(timeout + RUN_TIMEOUT_GRACE);
        }
        let process = builder.arg(command).build();

        let output = self.runner.run(process.clone()).await?;

        // juju may exit non-zero when the remote command did; the JSON
        // result is authoritative whenever it parses
        let remote = match parse_run_output(unit, &output.stdout) {
            Some(remote) => remote,
            None if !output.status.success() => {
                return Err(ProcessError::failed(&process, &output));
            }
            None => {
                return Err(ProcessError::InvalidOutput {
                    command: process.display(),
                    message: format!("no run result for {unit}"),
                });
            }
        };

        tracing::debug!(
            unit,
            command,
            exit_code = remote.exit_code,
            elapsed = ?start.elapsed(),
            "remote command finished"
        );
        tracing::trace!("{unit} output:\n{}", remote.output);

        Ok(remote)
    }

    async fn remove_application(&self, application: &str) -> Result<(), ProcessError> {
        self.checked(self.command().args(["remove-application", application]))
            .await?;
        Ok(())
    }
}
