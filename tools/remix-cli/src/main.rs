//! Remix CLI: plan and compile video variant batches.
//!
//! Usage:
//!   remix init <PATH>         Write a sample batch request
//!   remix validate <PATH>     Validate a batch request
//!   remix plan <PATH>         Print the render plans of a batch
//!   remix compile <PATH>      Plan and compile a batch into a JSON report

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use remix_common::config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "remix",
    about = "Plan distinct video variants and compile them into filter graphs",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Application config file (defaults to $XDG_CONFIG_HOME/remix/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample batch request
    Init {
        /// Where to write the request
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Also write the default application config
        #[arg(long)]
        with_config: bool,
    },

    /// Validate a batch request
    Validate {
        /// Path to the request file
        path: PathBuf,
    },

    /// Plan a batch and print a summary of each variant
    Plan {
        /// Path to the request file
        path: PathBuf,

        /// Override the requested output count
        #[arg(long)]
        count: Option<usize>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the plans as JSON
        #[arg(long)]
        json: bool,
    },

    /// Plan and compile a batch into a JSON report
    Compile {
        /// Path to the request file
        path: PathBuf,

        /// Report file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the requested output count
        #[arg(long)]
        count: Option<usize>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Index of the first variant, for continuing an earlier batch
        #[arg(long, default_value = "0")]
        start_index: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    let logging = LoggingConfig {
        level: if cli.verbose {
            "debug".to_string()
        } else {
            app_config.logging.level.clone()
        },
        json: cli.json_logs || app_config.logging.json,
        file: app_config.logging.file.clone(),
    };
    remix_common::logging::init_logging(&logging);
    tracing::debug!(
        config = ?cli.config,
        tolerance = app_config.planner.duration_tolerance_secs,
        retries = app_config.planner.group_retry_attempts,
        "Loaded application config"
    );

    match cli.command {
        Commands::Init {
            path,
            force,
            with_config,
        } => commands::init::run(path, force, with_config, &app_config),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Plan {
            path,
            count,
            seed,
            json,
        } => commands::plan::run(path, count, seed, json, &app_config),
        Commands::Compile {
            path,
            output,
            count,
            seed,
            start_index,
        } => commands::compile::run(path, output, count, seed, start_index, &app_config),
    }
}
