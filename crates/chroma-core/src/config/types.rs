//! Sub-configuration structs with defaults matching the fixed pipeline layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Newline-delimited list of image URLs
    pub input: PathBuf,

    /// CSV file receiving one line per analyzed image
    pub output: PathBuf,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.txt"),
            output: PathBuf::from("output.csv"),
        }
    }
}

/// Pool sizes and queue capacities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of concurrent fetch workers
    pub fetch_workers: usize,

    /// Number of concurrent analyzer workers
    pub analyze_workers: usize,

    /// Capacity of the source → fetcher queue
    pub url_queue_capacity: usize,

    /// Capacity of the fetcher → analyzer queue
    pub image_queue_capacity: usize,

    /// Capacity of the analyzer → sink queue
    pub result_queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_workers: 8,
            analyze_workers: 4,
            url_queue_capacity: 64,
            image_queue_capacity: 16,
            result_queue_capacity: 64,
        }
    }
}

/// Fetch stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Extra attempts after a decode that produced an empty image
    pub decode_retries: u32,

    /// User-Agent header sent with HTTP requests
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            decode_retries: 5,
            user_agent: format!("chroma/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
