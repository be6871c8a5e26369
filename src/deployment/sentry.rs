use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{HarnessError, Result};
use crate::juju::status::unit_number;
use crate::juju::{JujuClient, ModelStatus, RemoteOutput};
use crate::subprocess::ProcessError;

/// Handle on one deployed unit, used to run commands on it
#[derive(Clone)]
pub struct UnitSentry {
    unit: String,
    juju: Arc<dyn JujuClient>,
}

impl UnitSentry {
    pub fn new(unit: impl Into<String>, juju: Arc<dyn JujuClient>) -> Self {
        Self {
            unit: unit.into(),
            juju,
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Run `command` on the unit. A non-zero exit code is returned, not raised.
    pub async fn run(&self, command: &str) -> std::result::Result<RemoteOutput, ProcessError> {
        self.juju.run(&self.unit, command).await
    }
}

impl fmt::Debug for UnitSentry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitSentry").field("unit", &self.unit).finish()
    }
}

/// Sentries for every deployed role, built once and shared by all checks
#[derive(Debug, Clone, Default)]
pub struct ClusterContext {
    sentries: BTreeMap<String, Vec<UnitSentry>>,
}

impl ClusterContext {
    /// Collect the units of `roles` from a status snapshot, lowest unit number first
    pub fn from_status<'a>(
        status: &ModelStatus,
        roles: impl IntoIterator<Item = &'a str>,
        juju: Arc<dyn JujuClient>,
    ) -> Self {
        let mut sentries = BTreeMap::new();

        for role in roles {
            let Some(application) = status.application(role) else {
                continue;
            };
            let mut units: Vec<&String> = application.units.keys().collect();
            units.sort_by_key(|unit| (unit_number(unit), unit.to_string()));

            let handles: Vec<UnitSentry> = units
                .into_iter()
                .map(|unit| UnitSentry::new(unit.as_str(), Arc::clone(&juju)))
                .collect();
            if !handles.is_empty() {
                sentries.insert(role.to_string(), handles);
            }
        }

        Self { sentries }
    }

    /// First unit of `role`
    pub fn sentry(&self, role: &str) -> Result<&UnitSentry> {
        self.units(role)
            .first()
            .ok_or_else(|| HarnessError::MissingRole(role.to_string()))
    }

    pub fn units(&self, role: &str) -> &[UnitSentry] {
        self.sentries.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn require_roles(&self, required: &[&str]) -> Result<()> {
        for role in required {
            self.sentry(role)?;
        }
        Ok(())
    }
}
