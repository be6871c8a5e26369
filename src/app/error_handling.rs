use tracing::error;

use crate::error::{HarnessError, EXIT_CHECKS_FAILED};

/// Exit code for an error that ended the run
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<HarnessError>())
        .map_or(EXIT_CHECKS_FAILED, HarnessError::exit_code)
}

/// Print a fatal error and exit with the matching status code.
///
/// With `-v` the full cause chain is printed as well.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {:#}", error);

    eprintln!("Error: {error:#}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EXIT_CONFIG_ERROR, EXIT_PROVISIONING_FAILED};
    use anyhow::Context;
    use std::time::Duration;

    #[test]
    fn test_exit_code_from_harness_error() {
        let err = anyhow::Error::new(HarnessError::Config("bad".into()));
        assert_eq!(exit_code_for(&err), EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_exit_code_through_context() {
        let err: anyhow::Result<()> = Err(HarnessError::ProvisioningTimeout {
            stage: "workload messages".into(),
            timeout: Duration::from_secs(1800),
        })
        .context("acceptance run aborted");
        assert_eq!(exit_code_for(&err.unwrap_err()), EXIT_PROVISIONING_FAILED);
    }

    #[test]
    fn test_exit_code_for_foreign_error() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), EXIT_CHECKS_FAILED);
    }
}
