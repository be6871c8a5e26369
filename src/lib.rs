//! # bundle-acceptance
//!
//! Acceptance tests for a Hadoop, YARN and Hive cluster deployed with Juju.
//!
//! ## Usage
//!
//! ```bash
//! bundle-acceptance run [--bundle bundle.yaml] [--only components] [--teardown]
//! bundle-acceptance check --model hadoop
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging, exit codes and the end-to-end acceptance sequence
//! - `checks` - Process placement, HDFS, MapReduce and SQL checks
//! - `config` - TOML and environment configuration
//! - `deployment` - Provisioning waits, unit sentries and teardown
//! - `juju` - Client for the `juju` command line tool
//! - `subprocess` - Process execution behind a mockable trait
//! - `suite` - Ordered check execution and reporting
//! - `topology` - Bundle parsing and validation
pub mod app;
pub mod checks;
pub mod config;
pub mod deployment;
pub mod error;
pub mod juju;
pub mod subprocess;
pub mod suite;
pub mod topology;

pub use error::{HarnessError, Result};
