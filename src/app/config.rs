//! Process-wide settings that exist before any harness configuration is loaded.

use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Number of `-v` flags
    pub verbose: u8,
    /// Directory used to find `acceptance.toml` and `bundle.yaml`
    pub working_dir: PathBuf,
}

impl AppConfig {
    pub fn new(verbose: u8) -> Result<Self> {
        let working_dir =
            std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self {
            verbose,
            working_dir,
        })
    }

    /// Filter directive for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            working_dir: PathBuf::from("."),
        }
    }
}
