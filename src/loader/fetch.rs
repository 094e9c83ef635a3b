//! downloading remote content

use {
    crate::{FlipbookError, Result},
    reqwest::blocking::Client,
    std::time::Duration,
};

/// retrieves remote content
pub trait Fetcher {
    /// body of `url` as text
    fn fetch_text(&self, url: &str) -> Result<String>;

    /// body of `url` as raw bytes
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// blocking http client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// client with a sane timeout and our user agent
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("flipbook/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        log::debug!("fetching text from {url}");
        let text = self.client.get(url).send()?.error_for_status()?.text()?;
        Ok(text)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("fetching bytes from {url}");
        let bytes = self.client.get(url).send()?.error_for_status()?.bytes()?;
        Ok(bytes.to_vec())
    }
}

/// fetcher for hosts that have no network access
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineFetcher;

impl Fetcher for OfflineFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        Err(FlipbookError::Fetch(format!("offline, cannot fetch {url}")))
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Err(FlipbookError::Fetch(format!("offline, cannot fetch {url}")))
    }
}
