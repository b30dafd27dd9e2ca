//! prefab CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use prefab_config::{DEFAULT_PREFIX, PipelineOptions};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod load;

#[derive(Parser)]
#[command(name = "prefab")]
#[command(version)]
#[command(about = "Validate and inspect prefab deployment configuration", long_about = None)]
struct Cli {
    /// Show debug output from the configuration pipeline
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file to load
    #[arg(long, global = true, default_value = "prefab.json")]
    config_path: PathBuf,

    /// Prefix of environment variables available for substitution
    #[arg(long, global = true, default_value = DEFAULT_PREFIX)]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the configuration is valid
    Check,

    /// Print the normalized configuration
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List hosts with their connection strings
    Hosts,

    /// List roles with the connection strings of their hosts
    Roles,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "prefab=debug" } else { "prefab=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = PipelineOptions::new().with_prefix(cli.prefix);
    let config = match load::load_config(&cli.config_path, &options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_diagnostic().to_text());
            std::process::exit(e.exit_code());
        }
    };

    match cli.command {
        Commands::Check => commands::check::execute(&cli.config_path, &config),
        Commands::Show { format } => commands::show::execute(&config, format),
        Commands::Hosts => commands::hosts::execute(&config),
        Commands::Roles => commands::roles::execute(&config),
    }
}
