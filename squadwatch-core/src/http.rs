//! HTTP client abstraction for the third-party API integrations.
//!
//! Both upstream clients (monitoring API, identity API) talk through this
//! trait so tests can substitute canned responses without real network
//! requests. The default implementation wraps reqwest.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;

use crate::Error;

/// A generic trait for making GET requests against JSON APIs.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetches `url` and returns the response body. Non-2xx statuses are an
    /// error carrying the status code in the message.
    async fn get(&self, url: String, headers: HashMap<String, String>) -> Result<String, Error>;
}

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Result<Self, Error> {
        Self::with_network(None, false)
    }

    /// Builds a client honoring the configured network preferences: an
    /// optional outbound proxy and an IPv4-only local bind.
    pub fn with_network(proxy_url: Option<&str>, prefer_ipv4: bool) -> Result<Self, Error> {
        let mut builder = reqwest::ClientBuilder::new()
            .user_agent("squadwatch/0.1")
            .timeout(Duration::from_secs(30));

        if let Some(url) = proxy_url {
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| Error::Config(format!("invalid proxy URL '{url}': {e}")))?;
            builder = builder.proxy(proxy);
        }
        if prefer_ipv4 {
            builder = builder.local_address(Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)));
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn get(&self, url: String, headers: HashMap<String, String>) -> Result<String, Error> {
        let mut request = self.client.get(&url);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Platform(format!("GET {url} => HTTP {status}")));
        }
        Ok(response.text().await?)
    }
}
