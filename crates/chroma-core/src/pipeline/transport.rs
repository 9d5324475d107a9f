//! Retrieval of raw image bytes.
//!
//! `http` URLs that answer with a 301/302 pointing at an `https` location
//! are followed once. No other redirect is followed.

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{StatusCode, Url};

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult, PipelineError};

/// Fetches the body behind a URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn retrieve(&self, url: &Url) -> FetchResult<Vec<u8>>;
}

/// Transport for `http`, `https`, and `file` URLs.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport. Automatic redirects are disabled so that only the
    /// insecure-to-secure upgrade is honoured.
    pub fn new(config: &FetchConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PipelineError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn get(&self, url: &Url) -> FetchResult<reqwest::Response> {
        self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Io {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn retrieve_http(&self, url: &Url) -> FetchResult<Vec<u8>> {
        let mut response = self.get(url).await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok());
        if let Some(target) = secure_redirect(url, response.status(), location) {
            tracing::debug!("Following redirect {url} -> {target}");
            response = self.get(&target).await?;
        }

        let final_url = response.url().to_string();
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(FetchError::NotFound { url: final_url });
        }
        if !status.is_success() {
            return Err(FetchError::Io {
                url: final_url,
                message: format!("HTTP {status}"),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Io {
            url: final_url,
            message: e.to_string(),
        })?;
        Ok(body.to_vec())
    }

    async fn retrieve_file(&self, url: &Url) -> FetchResult<Vec<u8>> {
        let path = url.to_file_path().map_err(|_| FetchError::MalformedUrl {
            url: url.to_string(),
            message: "not a local file path".to_string(),
        })?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound {
                url: url.to_string(),
            },
            _ => FetchError::Io {
                url: url.to_string(),
                message: e.to_string(),
            },
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn retrieve(&self, url: &Url) -> FetchResult<Vec<u8>> {
        match url.scheme() {
            "http" | "https" => self.retrieve_http(url).await,
            "file" => self.retrieve_file(url).await,
            other => Err(FetchError::MalformedUrl {
                url: url.to_string(),
                message: format!("unsupported scheme {other:?}"),
            }),
        }
    }
}

/// The redirect target to follow, if any.
///
/// Only an `http` request answered with 301 or 302 whose `Location` is an
/// absolute `https` URL qualifies.
pub fn secure_redirect(requested: &Url, status: StatusCode, location: Option<&str>) -> Option<Url> {
    if requested.scheme() != "http" {
        return None;
    }
    if status != StatusCode::MOVED_PERMANENTLY && status != StatusCode::FOUND {
        return None;
    }
    Url::parse(location?)
        .ok()
        .filter(|target| target.scheme() == "https")
}
