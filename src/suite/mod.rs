//! Runs the registered checks in order and collects their outcomes.

pub mod report;

use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::checks::Check;
use crate::deployment::ClusterContext;

pub use report::{CheckOutcome, CheckStatus, SuiteReport};

pub struct Suite {
    checks: Vec<Box<dyn Check>>,
}

impl Suite {
    pub fn new(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[Box<dyn Check>] {
        &self.checks
    }

    /// Run every check in order. A failing check does not stop the ones after it.
    pub async fn run(&self, ctx: &ClusterContext) -> SuiteReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            info!("Running check {}: {}", check.name(), check.description());
            let start = Instant::now();
            let result = check.run(ctx).await;
            let duration = start.elapsed();

            let outcome = match result {
                Ok(()) => {
                    info!("{} passed in {:?}", check.name(), duration);
                    CheckOutcome::passed(check.name(), duration)
                }
                Err(failure) if failure.is_assertion() => {
                    warn!("{} failed: {}", check.name(), failure);
                    CheckOutcome::failed(check.name(), failure.to_string(), duration)
                }
                Err(failure) => {
                    error!("{} errored: {}", check.name(), failure);
                    CheckOutcome::errored(check.name(), failure.to_string(), duration)
                }
            };
            outcomes.push(outcome);
        }

        SuiteReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }
}
