//! Application layer
//!
//! Everything the binary needs beyond argument parsing:
//! - logging setup
//! - mapping fatal errors to exit codes
//! - the load, deploy, check, teardown sequence

pub mod config;
pub mod error_handling;
pub mod logging;
pub mod runtime;

pub use config::AppConfig;
pub use error_handling::handle_fatal_error;
pub use logging::init_logging;
pub use runtime::{run_acceptance, validate_bundle, RunMode};
