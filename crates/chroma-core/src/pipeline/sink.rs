//! Sink stage: writes result lines to the output.

use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWrite;

use crate::error::PipelineError;
use crate::output::ResultWriter;
use crate::types::RunStats;

use super::stage::StageInput;

/// The single consumer of result lines.
pub struct ResultSink<W: AsyncWrite + Unpin> {
    writer: ResultWriter<W>,
}

impl ResultSink<File> {
    /// Create (or truncate) the output file.
    pub async fn create(path: &Path) -> Result<Self, PipelineError> {
        let file = File::create(path)
            .await
            .map_err(|source| PipelineError::Output {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file))
    }
}

impl<W: AsyncWrite + Unpin> ResultSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: ResultWriter::new(writer),
        }
    }

    /// Write lines until shutdown, then flush and close the output.
    ///
    /// A failed write loses that line only; later lines are still written.
    /// Returns the underlying writer.
    pub async fn run(mut self, input: StageInput<String>, stats: &RunStats) -> W {
        while let Some(line) = input.next().await {
            match self.writer.write_line(&line).await {
                Ok(()) => stats.record_written(),
                Err(e) => {
                    stats.record_write_failure();
                    tracing::error!("Failed to write {line:?} to output: {e}");
                }
            }
        }

        if let Err(e) = self.writer.flush().await {
            tracing::error!("Failed to flush output: {e}");
        }
        if let Err(e) = self.writer.close().await {
            tracing::error!("Failed to close output: {e}");
        }
        tracing::debug!("sink: wrote {} lines", self.writer.lines_written());
        self.writer.into_inner()
    }
}
