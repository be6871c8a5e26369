use std::time::Duration;
use thiserror::Error;

use crate::subprocess::ProcessError;

/// Every check passed
pub const EXIT_SUCCESS: i32 = 0;
/// At least one check failed or errored
pub const EXIT_CHECKS_FAILED: i32 = 1;
/// Bad arguments, configuration or bundle
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// The cluster never came up
pub const EXIT_PROVISIONING_FAILED: i32 = 3;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    #[error("Provisioning timed out after {timeout:?} waiting for {stage}")]
    ProvisioningTimeout { stage: String, timeout: Duration },

    #[error("No units deployed for role '{0}'")]
    MissingRole(String),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl HarnessError {
    /// Process exit code for this error when it ends the run
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::Config(_)
            | HarnessError::Topology(_)
            | HarnessError::Yaml(_)
            | HarnessError::Toml(_)
            | HarnessError::Regex(_) => EXIT_CONFIG_ERROR,
            HarnessError::Provisioning(_)
            | HarnessError::ProvisioningTimeout { .. }
            | HarnessError::MissingRole(_) => EXIT_PROVISIONING_FAILED,
            HarnessError::Process(_) | HarnessError::Io(_) | HarnessError::Json(_) => {
                EXIT_CHECKS_FAILED
            }
        }
    }

    pub fn is_provisioning(&self) -> bool {
        self.exit_code() == EXIT_PROVISIONING_FAILED
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        assert_eq!(HarnessError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(HarnessError::Topology("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(
            HarnessError::ProvisioningTimeout {
                stage: "hive".into(),
                timeout: Duration::from_secs(1800),
            }
            .exit_code(),
            EXIT_PROVISIONING_FAILED
        );
        assert!(HarnessError::Provisioning("deploy".into()).is_provisioning());
        assert!(HarnessError::MissingRole("slave".into()).is_provisioning());
        assert_eq!(
            HarnessError::Process(ProcessError::CommandNotFound("juju".into())).exit_code(),
            EXIT_CHECKS_FAILED
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = HarnessError::ProvisioningTimeout {
            stage: "workload messages".into(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(
            err.to_string(),
            "Provisioning timed out after 5s waiting for workload messages"
        );
    }
}
