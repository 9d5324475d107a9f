//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pipeline = &self.pipeline;
        let checks = [
            (pipeline.fetch_workers, "pipeline.fetch_workers"),
            (pipeline.analyze_workers, "pipeline.analyze_workers"),
            (pipeline.url_queue_capacity, "pipeline.url_queue_capacity"),
            (pipeline.image_queue_capacity, "pipeline.image_queue_capacity"),
            (pipeline.result_queue_capacity, "pipeline.result_queue_capacity"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{name} must be > 0")));
            }
        }
        if self.io.input.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "io.input must not be empty".into(),
            ));
        }
        if self.io.output.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "io.output must not be empty".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
