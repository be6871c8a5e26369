use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Process timed out after {0:?}")]
    Timeout(Duration),

    #[error("`{command}` exited with code {code}:\n{output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("Unexpected output from `{command}`: {message}")]
    InvalidOutput { command: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

impl ProcessError {
    /// Build a `CommandFailed` from a finished process
    pub fn failed(command: &super::ProcessCommand, output: &super::ProcessOutput) -> Self {
        Self::CommandFailed {
            command: command.display(),
            code: output.status.code().unwrap_or(-1),
            output: output.combined(),
        }
    }
}
