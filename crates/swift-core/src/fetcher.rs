//! Blocklist retrieval

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use url::Url;

use crate::config::Config;
use crate::error::FetchError;
use crate::Result;

/// Source of raw hostlist bodies.
///
/// The loader only talks to this trait, so the network can be swapped out.
#[async_trait]
pub trait ListFetcher: Send + Sync {
    /// Fetch one list. Anything but a complete 200 response is an error.
    async fn fetch(&self, uri: &Url) -> std::result::Result<String, FetchError>;
}

/// `ListFetcher` backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::limited(config.max_redirects))
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ListFetcher for HttpFetcher {
    async fn fetch(&self, uri: &Url) -> std::result::Result<String, FetchError> {
        let response = self.client.get(uri.as_str()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Lists are treated as opaque lines, so bad UTF-8 is not an error
        let body = response.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
