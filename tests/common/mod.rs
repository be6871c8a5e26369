//! A scripted `juju` for running the whole acceptance sequence in-process.

#![allow(dead_code)]

use async_trait::async_trait;
use bundle_acceptance::config::HarnessConfig;
use bundle_acceptance::subprocess::{
    ExitStatus, ProcessCommand, ProcessError, ProcessOutput, ProcessRunner, SubprocessManager,
};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const BUNDLE: &str = r#"
services:
  namenode: {charm: cs:trusty/apache-hadoop-namenode-2, num_units: 1}
  resourcemanager: {charm: cs:trusty/apache-hadoop-resourcemanager-3, num_units: 1}
  slave: {charm: cs:trusty/apache-hadoop-slave-2, num_units: 2}
  plugin: {charm: cs:trusty/apache-hadoop-plugin-10}
  hive: {charm: cs:trusty/apache-hive-5, num_units: 1}
  mysql: {charm: cs:trusty/mysql-38, num_units: 1}
relations:
  - [resourcemanager, namenode]
  - [slave, resourcemanager]
  - [slave, namenode]
  - [plugin, namenode]
  - [hive, plugin]
  - ["hive:db", "mysql:db"]
"#;

pub const NAMENODE_JAVA: &str = "2301 /usr/lib/jvm/java-7-openjdk-amd64/bin/java -Dproc_namenode org.apache.hadoop.hdfs.server.namenode.NameNode\n\
2544 /usr/lib/jvm/java-7-openjdk-amd64/bin/java -Dproc_secondarynamenode org.apache.hadoop.hdfs.server.namenode.SecondaryNameNode";
pub const RESOURCEMANAGER_JAVA: &str = "1822 java -Dproc_resourcemanager org.apache.hadoop.yarn.server.resourcemanager.ResourceManager\n\
1990 java -Dproc_historyserver org.apache.hadoop.mapreduce.v2.hs.JobHistoryServer";
pub const SLAVE_JAVA: &str = "1400 java -Dproc_datanode org.apache.hadoop.hdfs.server.datanode.DataNode\n\
1502 java -Dproc_nodemanager org.apache.hadoop.yarn.server.nodemanager.NodeManager";
pub const HIVE_JAVA: &str = "3100 java -Xmx2048m org.apache.hadoop.util.RunJar /usr/lib/hive/lib/hive-service.jar org.apache.hive.service.server.HiveServer2";

struct ClusterState {
    deployed: bool,
    hive_message: String,
    listings: BTreeMap<String, String>,
    tables: BTreeSet<String>,
    lost_creates: bool,
    lost_drops: bool,
    failing: Vec<(String, i32, String)>,
    removed: Vec<String>,
}

/// In-memory cluster answering `juju deploy`, `status`, `run` and
/// `remove-application` the way a healthy deployment would
#[derive(Clone)]
pub struct FakeJuju {
    state: Arc<Mutex<ClusterState>>,
    calls: Arc<Mutex<Vec<ProcessCommand>>>,
}

impl FakeJuju {
    pub fn healthy() -> Self {
        let listings = BTreeMap::from([
            ("namenode".to_string(), NAMENODE_JAVA.to_string()),
            ("resourcemanager".to_string(), RESOURCEMANAGER_JAVA.to_string()),
            ("slave".to_string(), SLAVE_JAVA.to_string()),
            ("hive".to_string(), HIVE_JAVA.to_string()),
        ]);
        Self {
            state: Arc::new(Mutex::new(ClusterState {
                deployed: false,
                hive_message: "Ready".to_string(),
                listings,
                tables: BTreeSet::new(),
                lost_creates: false,
                lost_drops: false,
                failing: Vec::new(),
                removed: Vec::new(),
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pretend the applications are already up, as for `check`
    pub fn already_deployed(self) -> Self {
        self.state.lock().unwrap().deployed = true;
        self
    }

    pub fn with_hive_message(self, message: &str) -> Self {
        self.state.lock().unwrap().hive_message = message.to_string();
        self
    }

    pub fn with_listing(self, role: &str, listing: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .listings
            .insert(role.to_string(), listing.to_string());
        self
    }

    /// A table that exists before any check runs
    pub fn with_table(self, table: &str) -> Self {
        self.state.lock().unwrap().tables.insert(table.to_string());
        self
    }

    /// `create table` reports OK without creating anything
    pub fn losing_creates(self) -> Self {
        self.state.lock().unwrap().lost_creates = true;
        self
    }

    /// `drop table` reports OK without dropping anything
    pub fn losing_drops(self) -> Self {
        self.state.lock().unwrap().lost_drops = true;
        self
    }

    /// Remote commands containing `needle` exit with `code` and print `output`
    pub fn failing(self, needle: &str, code: i32, output: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .push((needle.to_string(), code, output.to_string()));
        self
    }

    pub fn manager(&self) -> SubprocessManager {
        SubprocessManager::new(Arc::new(self.clone()))
    }

    pub fn calls(&self) -> Vec<ProcessCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands sent to units through `juju run`, in order
    pub fn remote_commands(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter(|c| c.args.first().map(String::as_str) == Some("run"))
            .map(|c| (c.args[3].clone(), c.args.last().cloned().unwrap_or_default()))
            .collect()
    }

    pub fn removed(&self) -> Vec<String> {
        self.state.lock().unwrap().removed.clone()
    }

    pub fn tables(&self) -> BTreeSet<String> {
        self.state.lock().unwrap().tables.clone()
    }

    fn status(&self, state: &ClusterState) -> String {
        if !state.deployed {
            return json!({"applications": {}}).to_string();
        }
        let unit = |message: &str| {
            json!({
                "workload-status": {"current": "active", "message": message},
                "juju-status": {"current": "idle"}
            })
        };
        json!({
            "applications": {
                "namenode": {"units": {"namenode/0": unit("Ready (2 DataNodes)")}},
                "resourcemanager": {"units": {"resourcemanager/0": unit("Ready (2 NodeManagers)")}},
                "slave": {"units": {"slave/1": unit("Ready"), "slave/0": unit("Ready")}},
                "plugin": {"subordinate-to": ["hive"]},
                "hive": {"units": {"hive/0": unit(&state.hive_message)}},
                "mysql": {"units": {"mysql/0": unit("Ready")}}
            }
        })
        .to_string()
    }

    fn remote(&self, state: &mut ClusterState, unit: &str, command: &str) -> (i32, String) {
        if let Some((_, code, output)) = state
            .failing
            .iter()
            .find(|(needle, _, _)| command.contains(needle.as_str()))
        {
            return (*code, output.clone());
        }

        if command == "pgrep -a java" {
            let role = unit.split('/').next().unwrap_or_default();
            let listing = state.listings.get(role).cloned().unwrap_or_default();
            let code = if listing.is_empty() { 1 } else { 0 };
            return (code, listing);
        }

        if command.contains(" -f test.sql") {
            return (0, Self::sql(state, command));
        }

        (0, String::new())
    }

    /// Enough of a Hive client to track `create`, `drop` and `show tables`
    fn sql(state: &mut ClusterState, command: &str) -> String {
        let mut out = Vec::new();
        for statement in command.split(';') {
            let statement = statement.trim().trim_start_matches("echo '");
            if let Some(rest) = statement.strip_prefix("create table ") {
                let table: String = rest.chars().take_while(|c| *c != '(').collect();
                if !state.lost_creates {
                    state.tables.insert(table);
                }
                out.push("OK".to_string());
            } else if let Some(table) = statement.strip_prefix("drop table ") {
                if !state.lost_drops {
                    state.tables.remove(table.trim());
                }
                out.push("OK".to_string());
            } else if statement == "show tables" {
                out.push("OK".to_string());
                out.extend(state.tables.iter().cloned());
            }
        }
        out.join("\n")
    }
}

fn output(code: i32, stdout: String) -> ProcessOutput {
    ProcessOutput {
        status: if code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error(code)
        },
        stdout,
        stderr: String::new(),
        duration: Duration::from_millis(5),
    }
}

#[async_trait]
impl ProcessRunner for FakeJuju {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(command.clone());
        let mut state = self.state.lock().unwrap();
        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();

        match args.as_slice() {
            ["deploy", _] => {
                state.deployed = true;
                Ok(output(0, "Deploy of bundle completed.".to_string()))
            }
            ["status", "--format=json"] => Ok(output(0, self.status(&state))),
            ["run", "--format=json", "--unit", unit, .., remote] => {
                let (code, stdout) = self.remote(&mut state, unit, remote);
                let result = json!([{
                    "UnitId": unit,
                    "Stdout": stdout,
                    "ReturnCode": code
                }]);
                Ok(output(0, result.to_string()))
            }
            ["remove-application", application] => {
                state.removed.push(application.to_string());
                Ok(output(0, String::new()))
            }
            _ => Err(ProcessError::MockExpectationNotMet(format!(
                "unexpected juju call: {}",
                command.display()
            ))),
        }
    }
}

/// Config pointing at a bundle in a fresh temp dir, with fast polling
pub fn config(dir: &TempDir) -> HarnessConfig {
    let bundle = dir.path().join("bundle.yaml");
    std::fs::write(&bundle, BUNDLE).unwrap();

    let mut config = HarnessConfig {
        bundle,
        ..HarnessConfig::default()
    };
    config.deployment.poll_interval = Duration::from_millis(1);
    config.deployment.setup_timeout = Duration::from_secs(5);
    config.deployment.ready_timeout = Duration::from_secs(5);
    config
}
