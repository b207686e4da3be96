use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::config::Config;
use crate::errors::{GeneratorError, GeneratorResult};

#[cfg_attr(test, mockall::automock)]
pub trait PageFetcher {
    /// Body of a successful GET on `url`
    fn fetch(&self, url: &Url) -> GeneratorResult<String>;
}

/// Plain HTTP fetcher. No retries; the client timeout bounds every request.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> GeneratorResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> GeneratorResult<Self> {
        Self::new(config.http_timeout()?, &config.user_agent)
    }

    /// Status of a HEAD request. Any HTTP answer means the host is reachable.
    pub fn probe(&self, url: &Url) -> GeneratorResult<u16> {
        let response = self.client.head(url.as_str()).send()?;
        Ok(response.status().as_u16())
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> GeneratorResult<String> {
        tracing::debug!(url = %url, "Fetching page");

        let response = self.client.get(url.as_str()).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text()?)
    }
}
