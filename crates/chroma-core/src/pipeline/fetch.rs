//! Fetch stage: URL → decoded pixel grid, with retry on empty decodes.

use std::sync::Arc;

use reqwest::Url;

use crate::error::{FetchError, FetchResult};
use crate::types::{FetchedImage, PixelGrid, RunStats};

use super::decode::{Decode, DecodeOutcome};
use super::stage::{StageInput, StageOutput};
use super::transport::Transport;

const SUPPORTED_SCHEMES: [&str; 3] = ["http", "https", "file"];

/// Retrieves and decodes images.
///
/// A decode that produces nothing is treated as a transient anomaly: the
/// URL is retrieved and decoded again, up to `decode_retries` more times.
/// Every other failure is final for that URL.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    decoder: Arc<dyn Decode>,
    decode_retries: u32,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        decoder: Arc<dyn Decode>,
        decode_retries: u32,
    ) -> Self {
        Self {
            transport,
            decoder,
            decode_retries,
        }
    }

    /// Retrieve and decode one image.
    pub async fn fetch(&self, url: &str) -> FetchResult<PixelGrid> {
        let parsed = parse_url(url)?;
        let attempts = self.decode_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let body = self.transport.retrieve(&parsed).await?;

            let decoder = self.decoder.clone();
            let outcome = tokio::task::spawn_blocking(move || decoder.decode(&body))
                .await
                .map_err(|e| FetchError::Decode {
                    url: url.to_string(),
                    message: format!("Task join error: {e}"),
                })?;

            match outcome {
                DecodeOutcome::Image(grid) => return Ok(grid),
                DecodeOutcome::Invalid(message) => {
                    return Err(FetchError::Decode {
                        url: url.to_string(),
                        message,
                    })
                }
                DecodeOutcome::Empty if attempt < attempts => {
                    tracing::warn!("Empty image reading {url}, retrying ({attempt}/{attempts})");
                }
                DecodeOutcome::Empty => {}
            }
        }

        Err(FetchError::EmptyImage {
            url: url.to_string(),
            attempts,
        })
    }

    /// Worker loop: fetch every URL until shutdown, forwarding decoded
    /// images and dropping failures with a diagnostic.
    pub async fn run(
        &self,
        input: StageInput<String>,
        output: StageOutput<FetchedImage>,
        stats: &RunStats,
    ) {
        while let Some(url) = input.next().await {
            let grid = match self.fetch(&url).await {
                Ok(grid) => grid,
                Err(e) => {
                    stats.record_dropped();
                    tracing::warn!("{e}");
                    continue;
                }
            };

            tracing::debug!("Fetched {url} ({}x{})", grid.width(), grid.height());
            match output.send(FetchedImage { url, grid }).await {
                Ok(()) => stats.record_fetched(),
                Err(e) => {
                    stats.record_abandoned();
                    tracing::warn!("Dropped fetched image: {e}");
                }
            }
        }
    }
}

fn parse_url(url: &str) -> FetchResult<Url> {
    let parsed = Url::parse(url).map_err(|e| FetchError::MalformedUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    if !SUPPORTED_SCHEMES.contains(&parsed.scheme()) {
        return Err(FetchError::MalformedUrl {
            url: url.to_string(),
            message: format!("unsupported scheme {:?}", parsed.scheme()),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::pipeline::queue::{BoundedQueue, Envelope, PutError, SharedQueue, WorkQueue};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Returns the URL path as the body, or a canned error.
    #[derive(Default)]
    struct FakeTransport {
        calls: AtomicU32,
        error: Option<FetchError>,
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn retrieve(&self, url: &Url) -> FetchResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.error {
                Some(e) => Err(e.clone()),
                None => Ok(url.path().as_bytes().to_vec()),
            }
        }
    }

    /// Yields `Empty` for the first `failures` calls, then an image.
    struct FlakyDecoder {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyDecoder {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Decode for FlakyDecoder {
        fn decode(&self, bytes: &[u8]) -> DecodeOutcome {
            if bytes.ends_with(b"garbage") {
                return DecodeOutcome::Invalid("not an image".into());
            }
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                DecodeOutcome::Empty
            } else {
                DecodeOutcome::Image(PixelGrid::new(1, 1, vec![0x00FF00]).unwrap())
            }
        }
    }

    fn fetcher(transport: Arc<FakeTransport>, decoder: Arc<FlakyDecoder>) -> Fetcher {
        Fetcher::new(transport, decoder, 5)
    }

    #[tokio::test]
    async fn test_recovers_after_four_empty_decodes() {
        let transport = Arc::new(FakeTransport::default());
        let decoder = Arc::new(FlakyDecoder::new(4));
        let grid = fetcher(transport.clone(), decoder.clone())
            .fetch("http://example.com/a.png")
            .await
            .unwrap();

        assert_eq!(grid.pixels(), &[0x00FF00]);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
        assert_eq!(decoder.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_last_retry_can_succeed() {
        let transport = Arc::new(FakeTransport::default());
        let decoder = Arc::new(FlakyDecoder::new(5));
        let result = fetcher(transport.clone(), decoder)
            .fetch("http://example.com/a.png")
            .await;

        assert!(result.is_ok());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_gives_up_after_six_empty_decodes() {
        let transport = Arc::new(FakeTransport::default());
        let decoder = Arc::new(FlakyDecoder::new(6));
        let err = fetcher(transport.clone(), decoder)
            .fetch("http://example.com/a.png")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::EmptyImage {
                url: "http://example.com/a.png".into(),
                attempts: 6
            }
        );
        assert_eq!(transport.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_invalid_image_not_retried() {
        let transport = Arc::new(FakeTransport::default());
        let decoder = Arc::new(FlakyDecoder::new(0));
        let err = fetcher(transport.clone(), decoder)
            .fetch("http://example.com/garbage")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_urls_never_retrieved() {
        let transport = Arc::new(FakeTransport::default());
        let fetcher = fetcher(transport.clone(), Arc::new(FlakyDecoder::new(0)));

        for bad in ["not a url", "example.com/a.png", "ftp://example.com/a.png"] {
            let err = fetcher.fetch(bad).await.unwrap_err();
            assert!(matches!(err, FetchError::MalformedUrl { .. }), "{bad}");
        }
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_not_retried() {
        let transport = Arc::new(FakeTransport {
            calls: AtomicU32::new(0),
            error: Some(FetchError::NotFound {
                url: "http://example.com/a.png".into(),
            }),
        });
        let err = fetcher(transport.clone(), Arc::new(FlakyDecoder::new(0)))
            .fetch("http://example.com/a.png")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_worker_drops_failures_and_forwards_images() {
        let urls: SharedQueue<String> = BoundedQueue::shared(8);
        let images: SharedQueue<FetchedImage> = BoundedQueue::shared(8);
        let stats = RunStats::default();
        let fetcher = fetcher(
            Arc::new(FakeTransport::default()),
            Arc::new(FlakyDecoder::new(0)),
        );

        for url in ["http://a/1.png", "bogus", "http://a/garbage", "http://a/2.png"] {
            urls.put(Envelope::Item(url.to_string())).await.unwrap();
        }
        urls.put(Envelope::Shutdown).await.unwrap();

        fetcher
            .run(
                StageInput::new("fetch", urls, 1),
                StageOutput::new("fetch", images.clone()),
                &stats,
            )
            .await;

        let mut fetched = Vec::new();
        for _ in 0..2 {
            match images.take().await.unwrap() {
                Envelope::Item(image) => fetched.push(image.url),
                Envelope::Shutdown => panic!("fetch worker must not forward shutdown"),
            }
        }
        assert_eq!(fetched, vec!["http://a/1.png", "http://a/2.png"]);

        let summary = stats.summary();
        assert_eq!(summary.images_fetched, 2);
        assert_eq!(summary.fetches_dropped, 2);
    }

    /// Output queue whose every insert is interrupted.
    struct InterruptedQueue;

    #[async_trait]
    impl WorkQueue<FetchedImage> for InterruptedQueue {
        async fn put(&self, message: Envelope<FetchedImage>) -> Result<(), PutError<FetchedImage>> {
            Err(PutError {
                kind: QueueError::Interrupted,
                message,
            })
        }

        async fn take(&self) -> Result<Envelope<FetchedImage>, QueueError> {
            Err(QueueError::Closed)
        }
    }

    #[tokio::test]
    async fn test_abandoned_image_not_counted_as_fetched() {
        let urls: SharedQueue<String> = BoundedQueue::shared(4);
        let stats = RunStats::default();
        urls.put(Envelope::Item("http://a/1.png".to_string()))
            .await
            .unwrap();
        urls.put(Envelope::Shutdown).await.unwrap();

        fetcher(
            Arc::new(FakeTransport::default()),
            Arc::new(FlakyDecoder::new(0)),
        )
        .run(
            StageInput::new("fetch", urls, 1),
            StageOutput::new("fetch", Arc::new(InterruptedQueue)),
            &stats,
        )
        .await;

        let summary = stats.summary();
        assert_eq!(summary.images_fetched, 0);
        assert_eq!(summary.items_abandoned, 1);
        assert_eq!(summary.fetches_dropped, 0);
    }
}
