use async_trait::async_trait;

use super::matcher::{Contains, OutputMatcher};
use super::roles::HIVE;
use super::{ensure, Check, CheckFailure};
use crate::config::CheckSettings;
use crate::deployment::{ClusterContext, UnitSentry};

/// Script file written on the remote unit before each client run
const SCRIPT_FILE: &str = "test.sql";

/// How SQL reaches Hive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlClient {
    /// The `hive` command line client
    HiveCli,
    /// `beeline` over JDBC; `connect` is the `!connect ...;` line prepended to every script
    Beeline { connect: String },
}

impl SqlClient {
    pub fn beeline(settings: &CheckSettings) -> Self {
        SqlClient::Beeline {
            connect: format!(
                "!connect {} {} {} {};",
                settings.beeline_url,
                settings.beeline_user,
                settings.beeline_password,
                settings.beeline_driver
            ),
        }
    }

    fn program(&self) -> &'static str {
        match self {
            SqlClient::HiveCli => "hive",
            SqlClient::Beeline { .. } => "beeline",
        }
    }

    fn script(&self, sql: &str) -> String {
        match self {
            SqlClient::HiveCli => sql.to_string(),
            SqlClient::Beeline { connect } => format!("{connect}{sql}"),
        }
    }

    /// Shell command that writes `sql` to a script and runs the client on it as `user`
    pub fn command(&self, user: &str, sql: &str) -> String {
        let client = format!("{} -f {SCRIPT_FILE} 2>&1", self.program());
        format!(
            "echo {} > {SCRIPT_FILE}; sudo su {} -c {}",
            shell_words::quote(&self.script(sql)),
            user,
            shell_words::quote(&client)
        )
    }
}

/// Run `sql` through `client` on `sentry`, returning the client output
pub async fn run_sql(
    sentry: &UnitSentry,
    client: &SqlClient,
    user: &str,
    sql: &str,
) -> Result<String, CheckFailure> {
    tracing::debug!("{} on {}: {}", client.program(), sentry.unit(), sql);
    let result = sentry.run(&client.command(user, sql)).await?;
    ensure(result.success(), || {
        format!(
            "Hive command failed ({}): {}",
            result.exit_code, result.output
        )
    })?;
    Ok(result.output)
}

/// Create a table, see it listed, drop it
pub struct SqlTableCheck {
    name: &'static str,
    description: &'static str,
    client: SqlClient,
    table: String,
    user: String,
    verify_drop: bool,
}

impl SqlTableCheck {
    pub fn hive_cli(settings: &CheckSettings) -> Self {
        Self {
            name: "hive_cli",
            description: "create, list and drop a table through the hive CLI",
            client: SqlClient::HiveCli,
            table: "test_cli".to_string(),
            user: settings.hive_user.clone(),
            verify_drop: settings.verify_drop,
        }
    }

    pub fn beeline(settings: &CheckSettings) -> Self {
        Self {
            name: "beeline",
            description: "create, list and drop a table through beeline over JDBC",
            client: SqlClient::beeline(settings),
            table: "test_beeline".to_string(),
            user: settings.hive_user.clone(),
            verify_drop: settings.verify_drop,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl Check for SqlTableCheck {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    async fn run(&self, ctx: &ClusterContext) -> Result<(), CheckFailure> {
        let sentry = ctx.sentry(HIVE)?;
        let table = Contains::new(self.table.as_str());
        let (client, user) = (&self.client, self.user.as_str());

        let output = run_sql(sentry, client, user, "show tables;").await?;
        ensure(!table.matches(&output), || {
            format!("{table} already listed before create:\n{output}")
        })?;

        let create = format!("create table {table}(col1 int, col2 string); show tables;");
        let output = run_sql(sentry, client, user, &create).await?;
        ensure(table.matches(&output), || {
            format!("{table} not listed after create:\n{output}")
        })?;

        run_sql(sentry, client, user, &format!("drop table {table};")).await?;

        if self.verify_drop {
            let output = run_sql(sentry, client, user, "show tables;").await?;
            ensure(!table.matches(&output), || {
                format!("{table} still listed after drop:\n{output}")
            })?;
        }

        Ok(())
    }
}
