//! Cluster bootstrapper: deploys the topology and waits for it to come up.

pub mod progress;
pub mod sentry;

use regex::Regex;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{HarnessError, Result};
use crate::juju::{JujuClient, ModelStatus};
use crate::topology::Topology;

pub use progress::WaitSpinner;
pub use sentry::{ClusterContext, UnitSentry};

pub struct Deployment {
    juju: Arc<dyn JujuClient>,
    series: String,
    poll_interval: Duration,
    topology: Option<Topology>,
}

/// Whether every principal application has all its units up and idle.
/// A unit in error state aborts the wait.
fn units_settled(topology: &Topology, status: &ModelStatus) -> Result<bool> {
    let mut settled = true;

    for (role, expected) in topology.principals() {
        let Some(application) = status.application(role) else {
            debug!("{role}: not in status yet");
            settled = false;
            continue;
        };

        for (name, unit) in &application.units {
            if unit.is_errored() {
                return Err(HarnessError::Provisioning(format!(
                    "unit {name} is in error state: {}",
                    unit.workload.message
                )));
            }
        }

        let idle = application.units.values().filter(|u| u.is_idle()).count();
        if idle < expected as usize {
            debug!("{role}: {idle}/{expected} units idle");
            settled = false;
        }
    }

    Ok(settled)
}

/// Whether every unit of each role reports a matching workload message
fn messages_match(expected: &BTreeMap<String, Regex>, status: &ModelStatus) -> bool {
    expected.iter().all(|(role, pattern)| {
        let Some(application) = status.application(role) else {
            return false;
        };
        !application.units.is_empty()
            && application
                .units
                .values()
                .all(|unit| pattern.is_match(&unit.workload.message))
    })
}

impl Deployment {
    pub fn new(juju: Arc<dyn JujuClient>, series: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            juju,
            series: series.into(),
            poll_interval,
            topology: None,
        }
    }

    pub fn load(&mut self, topology: Topology) {
        self.topology = Some(topology);
    }

    pub fn topology(&self) -> Result<&Topology> {
        self.topology
            .as_ref()
            .ok_or_else(|| HarnessError::Config("no topology loaded".to_string()))
    }

    /// Deploy the loaded topology and block until its units settle
    pub async fn setup(&self, timeout: Duration) -> Result<()> {
        let topology = self.topology()?;
        let yaml = topology.to_deployable_yaml(&self.series)?;

        let mut bundle = tempfile::Builder::new()
            .prefix("bundle-")
            .suffix(".yaml")
            .tempfile()?;
        bundle.write_all(yaml.as_bytes())?;
        bundle.flush()?;

        info!(
            "Deploying {} applications (series {})",
            topology.roles().count(),
            topology.series().unwrap_or(&self.series)
        );
        self.juju
            .deploy(bundle.path())
            .await
            .map_err(|e| HarnessError::Provisioning(format!("juju deploy failed: {e}")))?;

        self.poll_until("units to settle", timeout, |status| {
            units_settled(topology, status)
        })
        .await
    }

    /// Block until every unit of each role has a workload message matching its pattern
    pub async fn wait_for_messages(
        &self,
        expected: &BTreeMap<String, Regex>,
        timeout: Duration,
    ) -> Result<()> {
        let roles: Vec<&str> = expected.keys().map(String::as_str).collect();
        info!("Waiting for workload messages from {}", roles.join(", "));

        self.poll_until("workload messages", timeout, |status| {
            Ok(messages_match(expected, status))
        })
        .await
    }

    /// Sentries for every role of the loaded topology
    pub async fn sentries(&self) -> Result<ClusterContext> {
        let topology = self.topology()?;
        let status = self
            .juju
            .status()
            .await
            .map_err(|e| HarnessError::Provisioning(format!("juju status failed: {e}")))?;

        Ok(ClusterContext::from_status(
            &status,
            topology.roles(),
            Arc::clone(&self.juju),
        ))
    }

    /// Remove every application of the topology, attempting all of them
    pub async fn teardown(&self) -> Result<()> {
        let topology = self.topology()?;
        let mut failed = Vec::new();

        for role in topology.roles() {
            info!("Removing application {role}");
            if let Err(e) = self.juju.remove_application(role).await {
                warn!("Failed to remove {role}: {e}");
                failed.push(role.to_string());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::Provisioning(format!(
                "teardown failed for: {}",
                failed.join(", ")
            )))
        }
    }

    async fn poll_until<F>(&self, stage: &str, timeout: Duration, mut ready: F) -> Result<()>
    where
        F: FnMut(&ModelStatus) -> Result<bool>,
    {
        let start = Instant::now();
        // a timeout too large to represent never expires
        let deadline = start.checked_add(timeout);
        let spinner = WaitSpinner::new(&format!("Waiting for {stage}"));

        loop {
            let status = match self.juju.status().await {
                Ok(status) => status,
                Err(e) => {
                    spinner.error(&format!("juju status failed while waiting for {stage}"));
                    return Err(HarnessError::Provisioning(format!("juju status failed: {e}")));
                }
            };

            match ready(&status) {
                Ok(true) => {
                    info!("Done waiting for {stage} after {:?}", start.elapsed());
                    spinner.success(&format!("{stage}: ready"));
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => {
                    spinner.error(&format!("{stage}: {e}"));
                    return Err(e);
                }
            }

            let now = Instant::now();
            let pause = match deadline {
                Some(deadline) if now >= deadline => {
                    spinner.error(&format!("{stage}: timed out"));
                    return Err(HarnessError::ProvisioningTimeout {
                        stage: stage.to_string(),
                        timeout,
                    });
                }
                Some(deadline) => self.poll_interval.min(deadline - now),
                None => self.poll_interval,
            };

            spinner.update(format!(
                "Waiting for {stage} ({}s elapsed)",
                start.elapsed().as_secs()
            ));
            tokio::time::sleep(pause).await;
        }
    }
}
