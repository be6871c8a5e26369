use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    Errored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub status: CheckStatus,
    /// Diagnostic text, including captured remote output, for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl CheckOutcome {
    pub fn passed(name: &str, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Passed,
            message: None,
            duration,
        }
    }

    pub fn failed(name: &str, message: String, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Failed,
            message: Some(message),
            duration,
        }
    }

    pub fn errored(name: &str, message: String, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Errored,
            message: Some(message),
            duration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<CheckOutcome>,
}

impl SuiteReport {
    fn count(&self, status: CheckStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(CheckStatus::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(CheckStatus::Failed)
    }

    pub fn errored(&self) -> usize {
        self.count(CheckStatus::Errored)
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.outcomes.len()
    }

    /// Human readable summary, one line per check followed by failure details
    pub fn render(&self) -> String {
        let mut out = String::new();

        for outcome in &self.outcomes {
            let label = match outcome.status {
                CheckStatus::Passed => "ok",
                CheckStatus::Failed => "FAILED",
                CheckStatus::Errored => "ERROR",
            };
            let _ = writeln!(
                out,
                "check {} ... {} ({:.1}s)",
                outcome.name,
                label,
                outcome.duration.as_secs_f64()
            );
        }

        let problems: Vec<&CheckOutcome> = self
            .outcomes
            .iter()
            .filter(|o| o.status != CheckStatus::Passed)
            .collect();
        if !problems.is_empty() {
            out.push_str("\nfailures:\n");
            for outcome in problems {
                let _ = writeln!(out, "\n---- {} ----", outcome.name);
                let _ = writeln!(out, "{}", outcome.message.as_deref().unwrap_or_default());
            }
        }

        let _ = writeln!(
            out,
            "\nresult: {}. {} passed, {} failed, {} errored; finished in {:.1}s",
            if self.all_passed() { "ok" } else { "FAILED" },
            self.passed(),
            self.failed(),
            self.errored(),
            (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
        );
        out
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
