//! Typed view of `juju status --format=json`.
//!
//! Only the fields the readiness waits look at are modelled; everything else
//! in the document is ignored.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelStatus {
    #[serde(default, alias = "services")]
    pub applications: BTreeMap<String, ApplicationStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationStatus {
    #[serde(default)]
    pub units: BTreeMap<String, UnitStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitStatus {
    #[serde(rename = "workload-status", default)]
    pub workload: StatusInfo,
    #[serde(rename = "juju-status", default)]
    pub agent: StatusInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusInfo {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub message: String,
}

impl ModelStatus {
    pub fn application(&self, name: &str) -> Option<&ApplicationStatus> {
        self.applications.get(name)
    }
}

impl UnitStatus {
    pub fn is_idle(&self) -> bool {
        self.agent.current == "idle"
    }

    pub fn is_errored(&self) -> bool {
        self.workload.current == "error" || self.agent.current == "error"
    }
}

/// Unit number from a unit name such as `slave/12`
pub fn unit_number(unit: &str) -> Option<u32> {
    unit.rsplit_once('/').and_then(|(_, n)| n.parse().ok())
}
