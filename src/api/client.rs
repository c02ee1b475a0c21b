use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::models::FetchConfig;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// The GET capability the fetch controller depends on. Implementations
/// report every failure through the `Result`; they never panic.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body at `url`, suspending until the response arrives.
    async fn get(&self, url: &str) -> Result<String>;

    /// Fetch the body at `url`, occupying the calling thread for the full
    /// round trip.
    fn get_blocking(&self, url: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct HttpClient {
    config: FetchConfig,
}

impl HttpClient {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> Result<String> {
        let client = Client::new();
        let body = client
            .get(url)
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(body)
    }

    fn get_blocking(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "blocking GET");

        let client = reqwest::blocking::Client::new();
        let body = client
            .get(url)
            .header("User-Agent", &self.config.user_agent)
            .send()?
            .error_for_status()?
            .text()?;

        Ok(body)
    }
}
