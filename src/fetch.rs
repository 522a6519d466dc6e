use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// A fetched HTML page. `url` is the final URL after redirects.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

impl Page {
    /// Resolve a relative or absolute link against this page's URL.
    pub fn resolve(&self, link: &str) -> Result<Url, url::ParseError> {
        self.url.join(link.trim())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}")]
    Status { status: u16 },
}

impl FetchError {
    /// Response status, when the server got far enough to send one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Request(e) => e.status().map(|s| s.as_u16()),
            FetchError::Status { status } => Some(*status),
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        let final_url = response.url().clone();
        let body = response.text().await?;
        debug!(url = %final_url, bytes = body.len(), "fetched");
        Ok(Page {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }
}
