//! Harness configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional TOML file, and `ACCEPTANCE_*` environment variables. Command
//! line flags are applied on top by the binary through [`ConfigOverrides`].

pub mod loader;


pub use loader::ConfigLoader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{HarnessError, Result};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "acceptance.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Bundle describing the cluster topology
    pub bundle: PathBuf,
    /// Default series for applications that do not name one
    pub series: String,
    pub juju: JujuSettings,
    pub deployment: DeploymentSettings,
    pub checks: CheckSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JujuSettings {
    /// `juju` executable
    pub binary: String,
    /// Model to operate on; the current model when unset
    pub model: Option<String>,
    /// Passed to `juju run --timeout`; remote commands block until done when unset
    #[serde(with = "humantime_serde")]
    pub run_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentSettings {
    #[serde(with = "humantime_serde")]
    pub setup_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub ready_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Role -> regular expression its units' workload message must match
    pub ready: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    pub hdfs_user: String,
    pub test_user: String,
    pub hive_user: String,
    pub examples_jar: String,
    pub teragen_rows: u64,
    pub beeline_url: String,
    pub beeline_user: String,
    pub beeline_password: String,
    pub beeline_driver: String,
    /// Re-list tables after `drop table` and require the test table to be gone
    pub verify_drop: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            bundle: PathBuf::from("bundle.yaml"),
            series: "trusty".to_string(),
            juju: JujuSettings::default(),
            deployment: DeploymentSettings::default(),
            checks: CheckSettings::default(),
        }
    }
}

impl Default for JujuSettings {
    fn default() -> Self {
        Self {
            binary: "juju".to_string(),
            model: None,
            run_timeout: None,
        }
    }
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            setup_timeout: Duration::from_secs(1800),
            ready_timeout: Duration::from_secs(1800),
            poll_interval: Duration::from_secs(10),
            ready: BTreeMap::from([("hive".to_string(), "Ready".to_string())]),
        }
    }
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            hdfs_user: "hdfs".to_string(),
            test_user: "ubuntu".to_string(),
            hive_user: "hive".to_string(),
            examples_jar: "/usr/lib/hadoop/share/hadoop/mapreduce/hadoop-mapreduce-examples-*.jar"
                .to_string(),
            teragen_rows: 10000,
            beeline_url: "jdbc:hive2://localhost:10000".to_string(),
            beeline_user: "hive".to_string(),
            beeline_password: "password".to_string(),
            beeline_driver: "org.apache.hive.jdbc.HiveDriver".to_string(),
            verify_drop: false,
        }
    }
}

impl DeploymentSettings {
    /// Compile the readiness patterns
    pub fn ready_patterns(&self) -> Result<BTreeMap<String, Regex>> {
        self.ready
            .iter()
            .map(|(role, pattern)| -> Result<(String, Regex)> {
                Ok((role.clone(), Regex::new(pattern)?))
            })
            .collect()
    }
}

impl HarnessConfig {
    /// Apply `ACCEPTANCE_*` variables from the process environment
    pub fn merge_env_vars(&mut self) {
        self.merge_env(|key| std::env::var(key).ok());
    }

    /// Apply `ACCEPTANCE_*` variables from an arbitrary lookup
    pub fn merge_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(binary) = lookup("ACCEPTANCE_JUJU") {
            self.juju.binary = binary;
        }
        if let Some(model) = lookup("ACCEPTANCE_MODEL") {
            self.juju.model = Some(model);
        }
        if let Some(series) = lookup("ACCEPTANCE_SERIES") {
            self.series = series;
        }
        if let Some(bundle) = lookup("ACCEPTANCE_BUNDLE") {
            self.bundle = PathBuf::from(bundle);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.juju.binary.trim().is_empty() {
            return Err(HarnessError::Config("juju binary must not be empty".into()));
        }
        if self.series.trim().is_empty() {
            return Err(HarnessError::Config("series must not be empty".into()));
        }
        if self.deployment.poll_interval.is_zero() {
            return Err(HarnessError::Config(
                "deployment.poll_interval must be greater than zero".into(),
            ));
        }
        if self.checks.teragen_rows == 0 {
            return Err(HarnessError::Config(
                "checks.teragen_rows must be greater than zero".into(),
            ));
        }
        self.deployment.ready_patterns()?;
        Ok(())
    }
}

/// Values taken from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bundle: Option<PathBuf>,
    pub series: Option<String>,
    pub model: Option<String>,
    pub verify_drop: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(bundle) = &self.bundle {
            config.bundle = bundle.clone();
        }
        if let Some(series) = &self.series {
            config.series = series.clone();
        }
        if let Some(model) = &self.model {
            config.juju.model = Some(model.clone());
        }
        if self.verify_drop {
            config.checks.verify_drop = true;
        }
    }
}
