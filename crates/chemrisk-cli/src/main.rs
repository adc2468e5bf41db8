mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chemrisk",
    version,
    about = "Chemical incompatibility and risk assessment for substance lists"
)]
struct Cli {
    /// Show detailed reasoning and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a JSON substance list: pairs, axis scores, pH, thermal stability
    Assess {
        /// Path to a JSON substance list
        input_file: PathBuf,

        /// Custom compatibility table (replaces the built-in one)
        #[arg(short, long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Show the hazard classes assigned to each substance
    Classify {
        /// Path to a JSON substance list
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Print the pairwise compatibility matrix
    Matrix {
        /// Path to a JSON substance list
        input_file: PathBuf,

        /// Custom compatibility table (replaces the built-in one)
        #[arg(short, long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect the built-in rule tables
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List the embedded rule tables
    List,
    /// Explain a table in plain language: axes, compat, classes, heuristics, or one axis name
    Explain {
        /// Table or axis name
        topic: String,
    },
    /// Print the raw JSON of an embedded table
    Export {
        /// Table name (classes, compatibility, axes, heuristics)
        table: String,
    },
    /// Validate a custom compatibility table
    Validate {
        /// Path to JSON compatibility file
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "chemrisk=debug,chemrisk_core=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Assess {
            input_file,
            rules,
            output,
        } => commands::assess::run(input_file, rules, &output, cli.verbose),
        Commands::Classify { input_file, output } => {
            commands::classify::run(input_file, &output, cli.verbose)
        }
        Commands::Matrix {
            input_file,
            rules,
            output,
        } => commands::matrix::run(input_file, rules, &output),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Explain { topic } => commands::rules::explain(&topic),
            RulesAction::Export { table } => commands::rules::export(&table),
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
