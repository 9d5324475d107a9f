//! Chroma Core - concurrent dominant-color extraction.
//!
//! Chroma reads a list of image URLs, fetches and decodes each image, finds
//! its three most frequent colors, and writes one CSV line per image:
//!
//! ```text
//! URLs → Fetch (×N) → Analyze (×M) → url,#RRGGBB,#RRGGBB,#RRGGBB
//! ```
//!
//! Stages are connected by bounded queues, so a slow stage holds back the
//! ones before it instead of buffering without limit.
//!
//! # Usage
//!
//! ```rust,ignore
//! use chroma_core::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> chroma_core::Result<()> {
//!     let config = Config::load()?;
//!     let summary = Pipeline::new(config)?.run().await?;
//!     println!("{} lines written", summary.lines_written);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod dominant;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use dominant::{ColorCounter, TopThree};
pub use error::{ChromaError, ConfigError, FetchError, PipelineError, QueueError, Result};
pub use output::{ResultLine, ResultWriter};
pub use pipeline::{Fetcher, Pipeline};
pub use types::{ColorTriple, FetchedImage, PixelGrid, RunStats, RunSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_from_default_config() {
        let pipeline = Pipeline::new(Config::default()).unwrap();
        assert_eq!(pipeline.config().pipeline.fetch_workers, 8);
        assert_eq!(pipeline.config().pipeline.analyze_workers, 4);
    }
}
