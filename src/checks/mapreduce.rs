use async_trait::async_trait;

use super::roles::HIVE;
use super::steps::{run_steps, Step};
use super::{as_user, Check, CheckFailure};
use crate::config::CheckSettings;
use crate::deployment::ClusterContext;

/// teragen, terasort and cleanup through YARN, verifying each job's `_SUCCESS` marker
pub struct MapReduceCheck {
    steps: Vec<Step>,
}

impl MapReduceCheck {
    pub fn new(settings: &CheckSettings) -> Self {
        let hdfs = settings.hdfs_user.as_str();
        let user = settings.test_user.as_str();
        let jar = settings.examples_jar.as_str();
        let gen_out = format!("/user/{user}/teragenout");
        let sort_out = format!("/user/{user}/terasortout");

        Self {
            steps: vec![
                Step::new(
                    "teragen",
                    as_user(
                        user,
                        &format!("hadoop jar {jar} teragen {} {gen_out}", settings.teragen_rows),
                    ),
                ),
                Step::new(
                    "mapreduce #1",
                    as_user(hdfs, &format!("hdfs dfs -ls {gen_out}/_SUCCESS")),
                ),
                Step::new(
                    "terasort",
                    as_user(user, &format!("hadoop jar {jar} terasort {gen_out} {sort_out}")),
                ),
                Step::new(
                    "mapreduce #2",
                    as_user(hdfs, &format!("hdfs dfs -ls {sort_out}/_SUCCESS")),
                ),
                Step::new("cleanup #1", as_user(hdfs, &format!("hdfs dfs -rm -r {gen_out}"))),
                Step::new("cleanup #2", as_user(hdfs, &format!("hdfs dfs -rm -r {sort_out}"))),
            ],
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[async_trait]
impl Check for MapReduceCheck {
    fn name(&self) -> &'static str {
        "yarn_mapreduce"
    }

    fn description(&self) -> &'static str {
        "teragen and terasort jobs complete and their output can be removed"
    }

    async fn run(&self, ctx: &ClusterContext) -> Result<(), CheckFailure> {
        run_steps(ctx.sentry(HIVE)?, &self.steps).await
    }
}
