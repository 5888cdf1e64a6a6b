use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, PRAGMA},
    Client, StatusCode,
};
use serde_json::Value;
use slog::{debug, Logger};
use std::time::Duration;

pub const GEO_JSON: &str = "application/geo+json";

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("error sending request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error {code} from {url}")]
    Status { url: String, code: u16 },
    #[error("error decoding body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn decode(url: &str, source: serde_json::Error) -> Self {
        FetchError::Decode {
            url: url.to_string(),
            source,
        }
    }
}

/// One outbound GET returning a parsed JSON document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

pub struct JsonFetcher {
    logger: Logger,
    client: Client,
}

impl JsonFetcher {
    /// Build a client with a bounded timeout, certificate verification on,
    /// and the headers weather.gov expects on every request.
    pub fn new(logger: Logger, user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GEO_JSON));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .danger_accept_invalid_certs(false)
            .build()?;

        Ok(Self { logger, client })
    }
}

#[async_trait]
impl Fetch for JsonFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        debug!(self.logger, "requesting: {}", url);
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| FetchError::Transport {
                    url: url.to_string(),
                    source,
                })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|e| FetchError::decode(url, e))
    }
}
