//! docrec - symptom-to-disease prediction CLI
//!
//! Usage:
//!   docrec symptoms                          # List the symptom universe
//!   docrec diseases                          # List diseases and specialists
//!   docrec predict -s itching -s skin_rash   # Predict with the default threshold
//!   docrec predict --symptoms chills,high_fever -t 50 --votes
//!   docrec predict -s cough --export report.csv --no-chart

use clap::{ArgAction, Parser, Subcommand};
use docrec::config::DocrecConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::{diseases, predict, symptoms};
use error::{CliError, Result};

/// docrec - Disease prediction from symptoms
///
/// Trains a six-model voting ensemble on a symptom table and reports the
/// diseases whose vote share reaches a confidence threshold.
#[derive(Parser)]
#[command(name = "docrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the dataset CSV files
    #[arg(long, global = true, env = "DOCREC_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List every symptom the model knows
    Symptoms,

    /// List known diseases with their specialist
    Diseases,

    /// Predict diseases for a set of symptoms
    Predict {
        /// Symptom to select (repeatable)
        #[arg(short, long = "symptom", value_name = "SYMPTOM")]
        symptom: Vec<String>,

        /// Comma-separated symptoms
        #[arg(long, value_delimiter = ',', value_name = "LIST")]
        symptoms: Vec<String>,

        /// Minimum chance in percent (0-100)
        #[arg(short, long)]
        threshold: Option<u32>,

        /// Skip the bar chart
        #[arg(long)]
        no_chart: bool,

        /// Write the findings to a CSV file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Show each model's vote
        #[arg(long)]
        votes: bool,
    },
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file (if any) with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<DocrecConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            DocrecConfig::from_json_file(path).map_err(|e| CliError::Config(e.to_string()))?
        }
        None => DocrecConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Symptoms => symptoms::run(&config, cli.json),

        Commands::Diseases => diseases::run(&config, cli.json),

        Commands::Predict {
            symptom,
            symptoms,
            threshold,
            no_chart,
            export,
            votes,
        } => {
            let selected: Vec<String> = symptom.into_iter().chain(symptoms).collect();
            let options = predict::PredictOptions {
                threshold: threshold.unwrap_or(u32::from(config.threshold)),
                chart: !no_chart,
                export,
                votes,
                json: cli.json,
            };
            predict::run(&config, &selected, &options)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            e.exit_code()
        }
    }
}
