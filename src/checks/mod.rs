//! The acceptance checks run against a provisioned cluster.
//!
//! Each check receives the shared [`ClusterContext`] and either passes or
//! reports a [`CheckFailure`]. Checks that mutate remote state in several
//! dependent steps express them as an ordered [`steps::Step`] list.

pub mod components;
pub mod hdfs;
pub mod mapreduce;
pub mod matcher;
pub mod sql;
pub mod steps;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::CheckSettings;
use crate::deployment::ClusterContext;
use crate::error::HarnessError;
use crate::subprocess::ProcessError;

pub use components::ComponentsCheck;
pub use hdfs::HdfsDirCheck;
pub use mapreduce::MapReduceCheck;
pub use matcher::{Contains, OutputMatcher, ProcessName};
pub use sql::{SqlClient, SqlTableCheck};
pub use steps::Step;

/// Role names as they appear in the bundle
pub mod roles {
    pub const NAMENODE: &str = "namenode";
    pub const RESOURCEMANAGER: &str = "resourcemanager";
    pub const SLAVE: &str = "slave";
    pub const HIVE: &str = "hive";

    /// Every role the checks need a sentry for
    pub const ALL: [&str; 4] = [NAMENODE, RESOURCEMANAGER, SLAVE, HIVE];
}

#[derive(Debug, Error)]
pub enum CheckFailure {
    /// An expected condition did not hold
    #[error("{0}")]
    Assertion(String),

    /// A command could not be run at all
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Harness(#[from] HarnessError),
}

impl CheckFailure {
    pub fn is_assertion(&self) -> bool {
        matches!(self, CheckFailure::Assertion(_))
    }
}

/// Fail with `message` unless `condition` holds
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), CheckFailure> {
    if condition {
        Ok(())
    } else {
        Err(CheckFailure::Assertion(message()))
    }
}

/// Wrap `command` so it runs as `user` on the remote node
pub fn as_user(user: &str, command: &str) -> String {
    format!("su {} -c {}", user, shell_words::quote(command))
}

#[async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn run(&self, ctx: &ClusterContext) -> Result<(), CheckFailure>;
}

/// All checks in execution order
pub fn default_checks(settings: &CheckSettings) -> Vec<Box<dyn Check>> {
    vec![
        Box::new(ComponentsCheck::default()),
        Box::new(HdfsDirCheck::new(settings)),
        Box::new(MapReduceCheck::new(settings)),
        Box::new(SqlTableCheck::hive_cli(settings)),
        Box::new(SqlTableCheck::beeline(settings)),
    ]
}

/// Keep only the checks named in `only`, preserving execution order.
/// An empty filter keeps everything.
pub fn select(
    checks: Vec<Box<dyn Check>>,
    only: &[String],
) -> Result<Vec<Box<dyn Check>>, HarnessError> {
    if only.is_empty() {
        return Ok(checks);
    }

    let unknown: Vec<&str> = only
        .iter()
        .map(String::as_str)
        .filter(|name| !checks.iter().any(|check| check.name() == *name))
        .collect();
    if !unknown.is_empty() {
        let known: Vec<&str> = checks.iter().map(|check| check.name()).collect();
        return Err(HarnessError::Config(format!(
            "unknown check(s): {} (available: {})",
            unknown.join(", "),
            known.join(", ")
        )));
    }

    Ok(checks
        .into_iter()
        .filter(|check| only.iter().any(|name| name == check.name()))
        .collect())
}
