use tracing::{debug, info};

use super::CheckFailure;
use crate::deployment::UnitSentry;

/// One command in an order-dependent sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub command: String,
    pub expected_exit: i32,
}

impl Step {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            expected_exit: 0,
        }
    }

    pub fn expecting(mut self, code: i32) -> Self {
        self.expected_exit = code;
        self
    }
}

/// Run `steps` in order on `sentry`, stopping at the first step whose exit
/// code differs from the expected one. Each step relies on the side effects
/// of the ones before it, so nothing is retried or skipped.
pub async fn run_steps(sentry: &UnitSentry, steps: &[Step]) -> Result<(), CheckFailure> {
    for (index, step) in steps.iter().enumerate() {
        info!(
            "[{}/{}] {} on {}",
            index + 1,
            steps.len(),
            step.name,
            sentry.unit()
        );
        debug!("$ {}", step.command);

        let result = sentry.run(&step.command).await?;
        if result.exit_code != step.expected_exit {
            debug!(
                "{} exited with {}, expected {}",
                step.name, result.exit_code, step.expected_exit
            );
            return Err(CheckFailure::Assertion(format!(
                "{} FAILED:\n{}",
                step.name, result.output
            )));
        }
    }
    Ok(())
}
