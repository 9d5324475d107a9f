//! Error types for the Chroma pipeline.
//!
//! Errors are organized by concern: configuration, stage setup, per-item
//! fetch failures, and queue operations. Per-item errors carry the URL they
//! relate to so diagnostics are actionable on their own.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Chroma operations.
#[derive(Error, Debug)]
pub enum ChromaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline setup errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors that prevent a pipeline run from starting.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The URL list could not be opened
    #[error("Cannot open input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The result file could not be created
    #[error("Cannot create output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// A stage task ended abnormally
    #[error("{stage} worker failed: {message}")]
    Worker { stage: &'static str, message: String },
}

/// Per-item fetch failures. None of these stop the fetch worker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The record is not a usable URL
    #[error("{url} is not a valid URL: {message}")]
    MalformedUrl { url: String, message: String },

    /// The resource does not exist
    #[error("URL {url} does not exist")]
    NotFound { url: String },

    /// Connection, transfer, or unexpected status failure
    #[error("Error fetching {url}: {message}")]
    Io { url: String, message: String },

    /// The body is not an image the decoder understands
    #[error("Cannot decode image from {url}: {message}")]
    Decode { url: String, message: String },

    /// Decoding kept producing nothing, even after retrying
    #[error("Reading {url} returned an empty image after {attempts} attempts")]
    EmptyImage { url: String, attempts: u32 },
}

/// Queue operation failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The blocking operation was interrupted before completing
    #[error("queue operation interrupted")]
    Interrupted,

    /// The queue can never deliver or accept another message
    #[error("queue closed")]
    Closed,
}

/// A result line that does not follow `<url>,#RRGGBB,#RRGGBB,#RRGGBB`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseResultError {
    /// Fewer than four comma-separated fields
    #[error("expected a URL followed by three colors")]
    MissingFields,

    /// The URL field is empty
    #[error("empty URL")]
    EmptyUrl,

    /// A color field is not `#` plus six hex digits
    #[error("invalid color field {0:?}")]
    InvalidColor(String),
}

/// Convenience type alias for Chroma results.
pub type Result<T> = std::result::Result<T, ChromaError>;

/// Convenience type alias for fetch results.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
