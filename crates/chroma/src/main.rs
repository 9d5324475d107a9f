//! Chroma CLI - report the three most frequent colors of images in a URL list.
//!
//! Chroma reads one image URL per line, fetches and decodes each image
//! concurrently, and writes `url,#RRGGBB,#RRGGBB,#RRGGBB` lines in
//! completion order.
//!
//! # Usage
//!
//! ```bash
//! # Process input.txt into output.csv
//! chroma run
//!
//! # Choose files and pool sizes
//! chroma run --input urls.txt --output colors.csv --fetchers 16
//!
//! # View configuration
//! chroma config show
//! ```

use std::path::Path;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Chroma - find the dominant colors of images listed by URL.
#[derive(Parser, Debug)]
#[command(name = "chroma")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch every URL in the input and write its dominant colors
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Commands::Run(args) => args.config.as_deref(),
        Commands::Config(_) => None,
    };

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match load_config(config_path) {
        Ok(config) => config,
        // An explicitly requested file must load
        Err(e) if config_path.is_some() => return Err(e.into()),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `chroma config path`."
            );
            chroma_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Chroma v{}", chroma_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<chroma_core::Config, chroma_core::ConfigError> {
    match path {
        Some(path) => chroma_core::Config::load_from(path),
        None => chroma_core::Config::load(),
    }
}
