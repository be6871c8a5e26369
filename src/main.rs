use anyhow::Context;
use bundle_acceptance::app::{self, AppConfig, RunMode};
use bundle_acceptance::checks;
use bundle_acceptance::config::{CheckSettings, ConfigLoader, ConfigOverrides, HarnessConfig};
use bundle_acceptance::error::{EXIT_CHECKS_FAILED, EXIT_SUCCESS};
use bundle_acceptance::subprocess::SubprocessManager;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Deploy a Hadoop/Hive bundle with Juju and verify it works
#[derive(Parser)]
#[command(name = "bundle-acceptance", version)]
#[command(about = "Acceptance tests for a Juju-deployed Hadoop, YARN and Hive cluster", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (defaults to ./acceptance.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the bundle, wait for it to settle and run the checks
    Run {
        #[command(flatten)]
        args: RunArgs,

        /// Remove every application of the bundle afterwards
        #[arg(long)]
        teardown: bool,
    },
    /// Run the checks against an already deployed model
    Check {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Parse and validate the bundle without contacting juju
    Validate {
        /// Bundle describing the cluster
        #[arg(long)]
        bundle: Option<PathBuf>,
    },
    /// List the checks in execution order
    List,
}

#[derive(Args)]
struct RunArgs {
    /// Bundle describing the cluster
    #[arg(long)]
    bundle: Option<PathBuf>,

    /// Default series for applications that do not name one
    #[arg(long)]
    series: Option<String>,

    /// Juju model to operate on
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Only run the named check (repeatable)
    #[arg(long = "only", value_name = "CHECK")]
    only: Vec<String>,

    /// List tables again after dropping the test table and require it gone
    #[arg(long)]
    verify_drop: bool,

    /// Write a JSON report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

impl RunArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bundle: self.bundle.clone(),
            series: self.series.clone(),
            model: self.model.clone(),
            verify_drop: self.verify_drop,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app_config = match AppConfig::new(cli.verbose) {
        Ok(config) => config,
        Err(e) => app::handle_fatal_error(e, cli.verbose),
    };
    app::init_logging(&app_config);

    let result = match cli.command {
        Commands::Run { args, teardown } => {
            run_command(&app_config, cli.config, args, RunMode::Deploy { teardown }).await
        }
        Commands::Check { args } => {
            run_command(&app_config, cli.config, args, RunMode::Attach).await
        }
        Commands::Validate { bundle } => {
            let overrides = ConfigOverrides {
                bundle,
                ..ConfigOverrides::default()
            };
            validate_command(&app_config, cli.config, overrides).await
        }
        Commands::List => {
            list_checks();
            Ok(EXIT_SUCCESS)
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => app::handle_fatal_error(e, cli.verbose),
    }
}

async fn load_config(
    app_config: &AppConfig,
    path: Option<PathBuf>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<HarnessConfig> {
    let loader = ConfigLoader::new(&app_config.working_dir);
    let mut config = loader.load(path.as_deref()).await?;
    overrides.apply(&mut config);
    Ok(config)
}

async fn run_command(
    app_config: &AppConfig,
    config_path: Option<PathBuf>,
    args: RunArgs,
    mode: RunMode,
) -> anyhow::Result<i32> {
    let config = load_config(app_config, config_path, &args.overrides()).await?;
    let manager = SubprocessManager::production();

    let report = app::run_acceptance(&config, mode, &args.only, &manager)
        .await
        .context("Acceptance run aborted")?;

    print!("{}", report.render());
    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }

    Ok(if report.all_passed() {
        EXIT_SUCCESS
    } else {
        EXIT_CHECKS_FAILED
    })
}

async fn validate_command(
    app_config: &AppConfig,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
) -> anyhow::Result<i32> {
    let config = load_config(app_config, config_path, &overrides).await?;
    let topology = app::validate_bundle(&config).await?;

    println!("Bundle {} is valid", config.bundle.display());
    for role in topology.roles() {
        let units = topology.node(role).map_or(0, |node| node.num_units);
        println!("  {role} ({units} units)");
    }
    println!("  {} relations", topology.relations().len());
    Ok(EXIT_SUCCESS)
}

fn list_checks() {
    for check in checks::default_checks(&CheckSettings::default()) {
        println!("{:<16} {}", check.name(), check.description());
    }
}
