//! Pipeline orchestration - wires the four stages together.
//!
//! ```text
//! UrlSource ─► urls ─► Fetcher ×N ─► images ─► Analyzer ×M ─► results ─► ResultSink
//! ```
//!
//! Each stage is drained in order. Once every worker of a stage has
//! returned, one shutdown marker is placed on its output queue, which the
//! downstream pool passes between its own workers. If the sink task dies
//! first, the remaining workers are aborted and the run fails.

use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::types::{FetchedImage, RunStats, RunSummary};

use super::analyze::Analyzer;
use super::decode::ImageDecoder;
use super::fetch::Fetcher;
use super::queue::{BoundedQueue, SharedQueue};
use super::sink::ResultSink;
use super::source::UrlSource;
use super::stage::{put_shutdown, StageInput, StageOutput};
use super::transport::HttpTransport;

/// A configured pipeline run.
pub struct Pipeline {
    config: Config,
    fetcher: Fetcher,
}

impl Pipeline {
    /// Create a pipeline that fetches over HTTP(S) and from local files.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.fetch)?;
        let fetcher = Fetcher::new(
            Arc::new(transport),
            Arc::new(ImageDecoder::new()),
            config.fetch.decode_retries,
        );
        Ok(Self { config, fetcher })
    }

    /// Create a pipeline with a custom fetcher.
    pub fn with_fetcher(config: Config, fetcher: Fetcher) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the configured input file and write the configured output file.
    ///
    /// Fails only if either file cannot be opened; per-URL failures are
    /// logged and counted in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let input = self.config.input_path();
        let output = self.config.output_path();
        tracing::info!("Reading URLs from {:?}, writing to {:?}", input, output);

        let source = UrlSource::open(&input).await?;
        let sink = ResultSink::create(&output).await?;
        let (summary, _) = self.run_stages(source, sink).await?;
        Ok(summary)
    }

    /// Run over an arbitrary reader and writer. Returns the summary and the
    /// writer once every line has been flushed to it.
    pub async fn run_with<R, W>(&self, reader: R, writer: W) -> Result<(RunSummary, W)>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.run_stages(UrlSource::new(reader), ResultSink::new(writer))
            .await
    }

    async fn run_stages<R, W>(
        &self,
        source: UrlSource<R>,
        sink: ResultSink<W>,
    ) -> Result<(RunSummary, W)>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let start = Instant::now();
        let pipeline = &self.config.pipeline;
        let fetch_workers = pipeline.fetch_workers;
        let analyze_workers = pipeline.analyze_workers;
        tracing::info!(
            "Starting pipeline: {} fetchers, {} analyzers",
            fetch_workers,
            analyze_workers
        );

        let stats = Arc::new(RunStats::default());
        let urls: SharedQueue<String> = BoundedQueue::shared(pipeline.url_queue_capacity);
        let images: SharedQueue<FetchedImage> =
            BoundedQueue::shared(pipeline.image_queue_capacity);
        let results: SharedQueue<String> = BoundedQueue::shared(pipeline.result_queue_capacity);

        let source_task = {
            let output = StageOutput::new("source", urls.clone());
            let stats = stats.clone();
            tokio::spawn(async move { source.run(&output, &stats).await })
        };

        let fetch_tasks: Vec<JoinHandle<()>> = (0..fetch_workers)
            .map(|_| {
                let fetcher = self.fetcher.clone();
                let input = StageInput::new("fetch", urls.clone(), fetch_workers);
                let output = StageOutput::new("fetch", images.clone());
                let stats = stats.clone();
                tokio::spawn(async move { fetcher.run(input, output, &stats).await })
            })
            .collect();

        let analyze_tasks: Vec<JoinHandle<()>> = (0..analyze_workers)
            .map(|_| {
                let input = StageInput::new("analyze", images.clone(), analyze_workers);
                let output = StageOutput::new("analyze", results.clone());
                let stats = stats.clone();
                tokio::spawn(async move { Analyzer::new().run(input, output, &stats).await })
            })
            .collect();

        let mut sink_task = {
            let input = StageInput::new("sink", results.clone(), 1);
            let stats = stats.clone();
            tokio::spawn(async move { sink.run(input, &stats).await })
        };

        let mut upstream = vec![source_task.abort_handle()];
        upstream.extend(fetch_tasks.iter().map(JoinHandle::abort_handle));
        upstream.extend(analyze_tasks.iter().map(JoinHandle::abort_handle));

        let drain = async {
            match source_task.await {
                Ok(count) => tracing::debug!("Source finished after {count} URLs"),
                Err(e) => tracing::error!("Source task failed: {e}"),
            }
            put_shutdown(urls.as_ref(), "source").await;

            join_pool("fetch", fetch_tasks).await;
            put_shutdown(images.as_ref(), "fetch").await;

            join_pool("analyze", analyze_tasks).await;
            put_shutdown(results.as_ref(), "analyze").await;
        };

        // The sink ends normally only after the last marker is in, so an
        // earlier exit means nothing drains the result queue any more.
        let early_exit = tokio::select! {
            () = drain => None,
            joined = &mut sink_task => Some(joined),
        };
        let joined = match early_exit {
            Some(joined) => joined,
            None => sink_task.await,
        };
        let writer = match joined {
            Ok(writer) => writer,
            Err(e) => {
                tracing::error!("Sink failed, stopping remaining workers: {e}");
                for handle in &upstream {
                    handle.abort();
                }
                return Err(PipelineError::Worker {
                    stage: "sink",
                    message: e.to_string(),
                }
                .into());
            }
        };

        let summary = stats.summary();
        tracing::info!(
            "Pipeline finished in {:.2?}: {} URLs, {} fetched, {} dropped, {} lines written",
            start.elapsed(),
            summary.urls_read,
            summary.images_fetched,
            summary.fetches_dropped,
            summary.lines_written
        );
        Ok((summary, writer))
    }
}

async fn join_pool(stage: &str, tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!("{stage} worker failed: {e}");
        }
    }
    tracing::debug!("{stage}: all workers stopped");
}
