use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::time::Duration;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to request the medal table page")]
    Request(#[from] reqwest::Error),
    #[error("medal table page responded with status {0}")]
    Status(u16),
    #[error("failed to fetch the medal table page after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

/// Retrieves the HTML of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .gzip(true)
            .timeout(timeout)
            .user_agent(concat!("medal_tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let res = self.client.get(url.clone()).send().await?;

        if let Err(e) = res.error_for_status_ref() {
            tracing::error!("error response returned from {}: {:?}", url, e);
            return Err(FetchError::Status(res.status().as_u16()));
        }

        let html = res.text().await?;
        Ok(html)
    }
}
