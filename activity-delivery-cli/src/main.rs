use activity_delivery_cli::application::{self, SCHEMA_NAMES};
use activity_delivery_cli::infrastructure::{load_bridge_config, read_json, write_json};
use activity_delivery_cli::{CliError, LogConfig, Result};
use activity_delivery_core::{CataAction, CataModel};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "delivery-cli")]
#[command(
    version,
    about = "Activity delivery CLI - author CATA models and replay delivery scenarios"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Write a Chrome trace (needs the chrome-trace feature)
    #[arg(long, global = true)]
    chrome_trace: bool,

    /// Serve tokio-console on 127.0.0.1:6669
    #[cfg(feature = "console")]
    #[arg(long, global = true)]
    console: bool,

    /// Bridge configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Author and grade check-all-that-apply models
    Cata {
        #[command(subcommand)]
        command: CataCommand,
    },

    /// Replay a delivery scenario against mounted activities
    Simulate {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print JSON schemas for the exchanged documents
    Schema {
        /// Schema name; lists the names when omitted
        name: Option<String>,

        /// Write `<name>.schema.json` files into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum CataCommand {
    /// Create a default model
    New {
        /// Start with targeted feedback enabled
        #[arg(long)]
        targeted: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a list of editing actions to a model
    Apply {
        #[arg(short, long)]
        model: PathBuf,

        /// JSON array of actions
        #[arg(short, long)]
        actions: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Grade a selection of choice ids
    Grade {
        #[arg(short, long)]
        model: PathBuf,

        /// Selected choice ids, comma separated
        #[arg(short, long, value_delimiter = ',')]
        select: Vec<String>,
    },

    /// Show the rule attached to every response
    Rules {
        #[arg(short, long)]
        model: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_verbosity(cli.verbose);
    if cli.json_logs {
        log_config = log_config.with_json();
    }
    if cli.chrome_trace {
        log_config = log_config.with_chrome_trace();
    }
    #[cfg(feature = "console")]
    if cli.console {
        log_config = log_config.with_console();
    }
    log_config.init().map_err(CliError::Logging)?;

    match cli.command {
        Commands::Cata { command } => run_cata(command),
        Commands::Simulate { scenario, output } => {
            let config = load_bridge_config(cli.config.as_deref())?;
            let scenario: application::Scenario = read_json(&scenario)?;
            info!(
                "Simulating {} activities over {} steps",
                scenario.activities.len(),
                scenario.steps.len()
            );

            let report = application::simulate(scenario, config).await?;
            write_json(&report, output.as_ref())
        }
        Commands::Schema { name, output_dir } => run_schema(name, output_dir),
    }
}

fn run_cata(command: CataCommand) -> Result<()> {
    match command {
        CataCommand::New { targeted, output } => {
            write_json(&application::new_model(targeted), output.as_ref())
        }
        CataCommand::Apply {
            model,
            actions,
            output,
        } => {
            let model: CataModel = read_json(&model)?;
            let actions: Vec<CataAction> = read_json(&actions)?;

            let (model, events) = application::apply_actions(model, actions)?;
            for event in &events {
                info!("{:?}", event);
            }
            write_json(&model, output.as_ref())
        }
        CataCommand::Grade { model, select } => {
            let model: CataModel = read_json(&model)?;
            write_json(&application::grade(&model, select), None)
        }
        CataCommand::Rules { model } => {
            let model: CataModel = read_json(&model)?;
            write_json(&application::list_rules(&model), None)
        }
    }
}

fn run_schema(name: Option<String>, output_dir: Option<PathBuf>) -> Result<()> {
    let names: Vec<&str> = match (&name, &output_dir) {
        (Some(name), _) => vec![name.as_str()],
        (None, Some(_)) => SCHEMA_NAMES.to_vec(),
        (None, None) => {
            for name in SCHEMA_NAMES {
                println!("{}", name);
            }
            return Ok(());
        }
    };

    if let Some(dir) = &output_dir {
        std::fs::create_dir_all(dir)?;
    }

    for name in names {
        let schema = application::schema(name)?;
        let path = output_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.schema.json", name)));
        write_json(&schema, path.as_ref())?;
    }

    Ok(())
}
