use async_trait::async_trait;

use super::roles::HIVE;
use super::steps::{run_steps, Step};
use super::{as_user, Check, CheckFailure};
use crate::config::CheckSettings;
use crate::deployment::ClusterContext;

/// Basic HDFS administration: create a user directory, hand it over, open it up
pub struct HdfsDirCheck {
    steps: Vec<Step>,
}

impl HdfsDirCheck {
    pub fn new(settings: &CheckSettings) -> Self {
        let hdfs = settings.hdfs_user.as_str();
        let user = settings.test_user.as_str();
        let home = format!("/user/{user}");

        Self {
            steps: vec![
                Step::new(
                    "Created a user directory on hdfs",
                    as_user(hdfs, &format!("hdfs dfs -mkdir -p {home}")),
                ),
                Step::new(
                    "Assigning an owner to hdfs directory",
                    as_user(hdfs, &format!("hdfs dfs -chown {user}:{user} {home}")),
                ),
                Step::new(
                    "Setting directory permission on hdfs",
                    as_user(hdfs, &format!("hdfs dfs -chmod -R 755 {home}")),
                ),
            ],
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[async_trait]
impl Check for HdfsDirCheck {
    fn name(&self) -> &'static str {
        "hdfs_dir"
    }

    fn description(&self) -> &'static str {
        "mkdir, chown and chmod of a user directory on HDFS"
    }

    async fn run(&self, ctx: &ClusterContext) -> Result<(), CheckFailure> {
        run_steps(ctx.sentry(HIVE)?, &self.steps).await
    }
}
