//! Source stage: reads URL records, one per line.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::error::PipelineError;
use crate::types::RunStats;

use super::stage::StageOutput;

/// Reads newline-delimited URL records from a byte source.
///
/// A trailing `\r` is stripped from each line and empty lines are skipped.
/// Input is expected to be ASCII; other bytes are replaced rather than
/// rejected.
pub struct UrlSource<R> {
    reader: R,
}

impl UrlSource<BufReader<File>> {
    /// Open a URL list on disk.
    pub async fn open(path: &Path) -> Result<Self, PipelineError> {
        let file = File::open(path).await.map_err(|source| PipelineError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: AsyncBufRead + Unpin> UrlSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Forward every non-empty line downstream. Returns the number of
    /// records forwarded.
    ///
    /// A read error ends the input early; records read so far still flow
    /// through the pipeline.
    pub async fn run(self, output: &StageOutput<String>, stats: &RunStats) -> usize {
        let mut lines = self.reader.split(b'\n');
        let mut forwarded = 0;

        loop {
            let raw = match lines.next_segment().await {
                Ok(Some(raw)) => raw,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed reading URL list: {e}");
                    break;
                }
            };
            let record = raw.strip_suffix(b"\r").unwrap_or(&raw);
            if record.is_empty() {
                continue;
            }

            let url = String::from_utf8_lossy(record).into_owned();
            stats.record_url();
            match output.send(url).await {
                Ok(()) => forwarded += 1,
                Err(e) => {
                    stats.record_abandoned();
                    tracing::warn!("Dropped URL record {:?}: {e}", String::from_utf8_lossy(record));
                }
            }
        }

        tracing::debug!("source: forwarded {forwarded} URL records");
        forwarded
    }
}
