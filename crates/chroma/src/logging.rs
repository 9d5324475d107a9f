//! Logging initialization.
//!
//! Log output goes to stderr; stdout is reserved for the `--summary-json`
//! report and `config` command output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `verbose` - If true, enables DEBUG level logging; otherwise `level`.
/// * `level` - Default filter directive when not verbose.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// The RUST_LOG environment variable overrides both `verbose` and `level`.
pub fn init(verbose: bool, level: &str, json_format: bool) {
    let default_level = if verbose { "debug" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI overrides.
pub fn init_from_config(
    config: &chroma_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let json_format = json_logs_override || config.logging.format == "json";
    init(verbose_override, &config.logging.level, json_format);
}
