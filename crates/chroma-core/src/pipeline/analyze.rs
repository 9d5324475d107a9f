//! Analyzer stage: pixel grid → formatted result line.

use crate::dominant::ColorCounter;
use crate::output::ResultLine;
use crate::types::{FetchedImage, RunStats};

use super::stage::{StageInput, StageOutput};

/// One analyzer worker and its private counting scratch.
///
/// The scratch is reused for every image this worker handles and is never
/// shared with other workers.
#[derive(Debug, Default)]
pub struct Analyzer {
    counter: Option<ColorCounter>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            counter: Some(ColorCounter::new()),
        }
    }

    /// Compute the dominant colors of one image on the blocking pool.
    ///
    /// Returns `None` if the computation panicked; the scratch is rebuilt
    /// for the next image in that case.
    pub async fn analyze(&mut self, image: FetchedImage) -> Option<ResultLine> {
        let mut counter = self.counter.take().unwrap_or_default();
        let task = tokio::task::spawn_blocking(move || {
            let colors = counter.dominant_colors(&image.grid);
            (counter, ResultLine::new(image.url, colors))
        });

        match task.await {
            Ok((counter, line)) => {
                self.counter = Some(counter);
                Some(line)
            }
            Err(e) => {
                tracing::error!("Color analysis failed: {e}");
                None
            }
        }
    }

    /// Worker loop: analyze every image until shutdown.
    pub async fn run(
        mut self,
        input: StageInput<FetchedImage>,
        output: StageOutput<String>,
        stats: &RunStats,
    ) {
        while let Some(image) = input.next().await {
            let Some(line) = self.analyze(image).await else {
                continue;
            };
            if line.colors.is_no_pixels() {
                tracing::warn!("{} has no pixels", line.url);
            }

            let line = line.to_string();
            tracing::debug!("Analyzed {line}");
            match output.send(line).await {
                Ok(()) => stats.record_result(),
                Err(e) => {
                    stats.record_abandoned();
                    tracing::warn!("Dropped result line: {e}");
                }
            }
        }
    }
}
