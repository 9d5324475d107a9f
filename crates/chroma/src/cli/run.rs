//! The `chroma run` command.

use std::path::PathBuf;

use chroma_core::{Config, Pipeline};
use clap::Args;

/// Arguments for the `run` command. Flags override the config file.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// File of image URLs, one per line
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Result file (created or truncated)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of fetch workers
    #[arg(long, env = "CHROMA_FETCHERS")]
    pub fetchers: Option<usize>,

    /// Number of analyzer workers
    #[arg(long, env = "CHROMA_ANALYZERS")]
    pub analyzers: Option<usize>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub summary_json: bool,
}

impl RunArgs {
    /// Apply command-line overrides and re-check the result.
    fn apply(&self, mut config: Config) -> anyhow::Result<Config> {
        if let Some(input) = &self.input {
            config.io.input = input.clone();
        }
        if let Some(output) = &self.output {
            config.io.output = output.clone();
        }
        if let Some(fetchers) = self.fetchers {
            config.pipeline.fetch_workers = fetchers;
        }
        if let Some(analyzers) = self.analyzers {
            config.pipeline.analyze_workers = analyzers;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let config = args.apply(config)?;
    let summary = Pipeline::new(config)?.run().await?;

    if summary.fetches_dropped > 0 || summary.write_failures > 0 {
        tracing::warn!(
            "{} URLs could not be processed, {} lines failed to write",
            summary.fetches_dropped,
            summary.write_failures
        );
    }
    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
