//! Declarative cluster topology loaded from a Juju bundle file.
//!
//! The bundle schema belongs to Juju; only the parts the harness reads are
//! typed here. The document itself is kept so it can be handed back to
//! `juju deploy` unchanged apart from the default series.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{HarnessError, Result};


/// Node specification for one role (a Juju application)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeSpec {
    pub charm: String,
    /// Zero for subordinate charms, which ride along on another unit
    #[serde(default)]
    pub num_units: u32,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub constraints: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub application: String,
    pub name: Option<String>,
}

impl Endpoint {
    fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((application, name)) => Self {
                application: application.to_string(),
                name: Some(name.to_string()),
            },
            None => Self {
                application: raw.to_string(),
                name: None,
            },
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{}", self.application, name),
            None => f.write_str(&self.application),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Deserialize)]
struct RawBundle {
    #[serde(default)]
    series: Option<String>,
    #[serde(default, alias = "services")]
    applications: BTreeMap<String, NodeSpec>,
    #[serde(default)]
    relations: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct Topology {
    series: Option<String>,
    nodes: BTreeMap<String, NodeSpec>,
    relations: Vec<Relation>,
    document: Mapping,
}

/// Old-style bundles nest everything under a single deployment name
fn unwrap_named_deployment(document: Mapping) -> Mapping {
    let has_apps = document.contains_key("services") || document.contains_key("applications");
    if has_apps || document.len() != 1 {
        return document;
    }
    match document.into_iter().next() {
        Some((_, Value::Mapping(inner))) => inner,
        Some((key, value)) => Mapping::from_iter([(key, value)]),
        None => Mapping::new(),
    }
}

/// Render a relation entry the way it is written in the bundle
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(describe).collect();
            format!("[{}]", items.join(", "))
        }
        other => format!("{other:?}"),
    }
}

/// Endpoint pairs of one relation entry. Besides `[a, b]` the one-to-many
/// form `[a, [b, c]]` relates `a` to each of `b` and `c`.
fn relation_pairs(entry: &Value) -> Result<Vec<(&str, &str)>> {
    let invalid = || {
        HarnessError::Topology(format!(
            "relation must name exactly two endpoints, as [a, b] or [a, [b, c]]: {}",
            describe(entry)
        ))
    };

    let [from, to] = entry.as_sequence().map(Vec::as_slice).ok_or_else(invalid)? else {
        return Err(invalid());
    };
    let from = from.as_str().ok_or_else(invalid)?;

    match to {
        Value::String(to) => Ok(vec![(from, to.as_str())]),
        Value::Sequence(targets) if !targets.is_empty() => targets
            .iter()
            .map(|target| target.as_str().map(|to| (from, to)).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

impl Topology {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            HarnessError::Topology(format!("cannot read bundle {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document = match serde_yaml::from_str::<Value>(content)? {
            Value::Mapping(mapping) => unwrap_named_deployment(mapping),
            _ => {
                return Err(HarnessError::Topology(
                    "bundle must be a YAML mapping".to_string(),
                ))
            }
        };

        let raw: RawBundle = serde_yaml::from_value(Value::Mapping(document.clone()))?;

        if raw.applications.is_empty() {
            return Err(HarnessError::Topology(
                "bundle defines no applications".to_string(),
            ));
        }

        let mut relations = Vec::with_capacity(raw.relations.len());
        for entry in &raw.relations {
            for (from, to) in relation_pairs(entry)? {
                let relation = Relation {
                    from: Endpoint::parse(from),
                    to: Endpoint::parse(to),
                };
                for endpoint in [&relation.from, &relation.to] {
                    if !raw.applications.contains_key(&endpoint.application) {
                        return Err(HarnessError::Topology(format!(
                            "relation endpoint '{endpoint}' names an unknown application"
                        )));
                    }
                }
                relations.push(relation);
            }
        }

        Ok(Self {
            series: raw.series,
            nodes: raw.applications,
            relations,
            document,
        })
    }

    /// Fail unless every role in `required` is part of the bundle
    pub fn require_roles(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|role| !self.nodes.contains_key(*role))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(HarnessError::Topology(format!(
                "bundle is missing required roles: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn node(&self, role: &str) -> Option<&NodeSpec> {
        self.nodes.get(role)
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Roles that get their own units, with the expected unit count
    pub fn principals(&self) -> impl Iterator<Item = (&str, u32)> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.num_units > 0)
            .map(|(role, node)| (role.as_str(), node.num_units))
    }

    /// The bundle as it should be handed to `juju deploy`
    pub fn to_deployable_yaml(&self, default_series: &str) -> Result<String> {
        let mut document = self.document.clone();
        if self.series.is_none() {
            document.insert(
                Value::String("series".to_string()),
                Value::String(default_series.to_string()),
            );
        }
        Ok(serde_yaml::to_string(&document)?)
    }
}
