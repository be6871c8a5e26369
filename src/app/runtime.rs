//! The acceptance sequence: load, provision, wait, check, tear down.

use std::sync::Arc;
use tracing::{info, warn};

use crate::checks::{self, roles};
use crate::config::HarnessConfig;
use crate::deployment::Deployment;
use crate::error::Result;
use crate::juju::JujuClient;
use crate::subprocess::SubprocessManager;
use crate::suite::{Suite, SuiteReport};
use crate::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Deploy the bundle first, optionally removing it afterwards
    Deploy { teardown: bool },
    /// Use whatever is already deployed in the model
    Attach,
}

/// Load and validate the configured bundle without contacting juju
pub async fn validate_bundle(config: &HarnessConfig) -> Result<Topology> {
    config.validate()?;
    let topology = Topology::from_file(&config.bundle).await?;
    topology.require_roles(&roles::ALL)?;
    Ok(topology)
}

/// Run the acceptance suite against the configured model.
///
/// Provisioning problems abort before any check runs. Check failures are
/// recorded in the returned report rather than returned as errors.
pub async fn run_acceptance(
    config: &HarnessConfig,
    mode: RunMode,
    only: &[String],
    manager: &SubprocessManager,
) -> Result<SuiteReport> {
    let suite = Suite::new(checks::select(
        checks::default_checks(&config.checks),
        only,
    )?);
    let topology = validate_bundle(config).await?;

    let juju: Arc<dyn JujuClient> = Arc::new(manager.juju(&config.juju));
    let mut deployment = Deployment::new(
        juju,
        config.series.clone(),
        config.deployment.poll_interval,
    );
    deployment.load(topology);

    let result = provision_and_check(&deployment, config, mode, &suite).await;

    if let RunMode::Deploy { teardown: true } = mode {
        if let Err(e) = deployment.teardown().await {
            warn!("Teardown incomplete: {e}");
        }
    }

    result
}

async fn provision_and_check(
    deployment: &Deployment,
    config: &HarnessConfig,
    mode: RunMode,
    suite: &Suite,
) -> Result<SuiteReport> {
    if let RunMode::Deploy { .. } = mode {
        deployment.setup(config.deployment.setup_timeout).await?;
    } else {
        info!("Attaching to existing deployment");
    }

    let ready = config.deployment.ready_patterns()?;
    deployment
        .wait_for_messages(&ready, config.deployment.ready_timeout)
        .await?;

    let ctx = deployment.sentries().await?;
    ctx.require_roles(&roles::ALL)?;

    info!("Running {} checks", suite.checks().len());
    Ok(suite.run(&ctx).await)
}
