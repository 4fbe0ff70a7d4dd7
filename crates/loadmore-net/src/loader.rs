//! Resource Loader
//!
//! HTTP transport on `reqwest`'s blocking client, moved off the executor
//! thread with `smol::unblock`.

use std::collections::HashMap;
use std::time::Duration;

use crate::{FetchResponse, NetError, Response, Transport};

/// GET request; the content endpoint is only ever read
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub url: String,
    pub headers: HashMap<String, String>,
}

impl Request {
    pub fn get(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

/// Load resources from network
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    client: reqwest::blocking::Client,
}

impl ResourceLoader {
    /// Default user agent
    pub const USER_AGENT: &'static str = concat!("loadmore/", env!("CARGO_PKG_VERSION"));

    pub fn new() -> Result<Self, NetError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Loader whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch a URL with GET
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse, NetError> {
        Ok(self.request(Request::get(url)).await?.into())
    }
}

impl Transport for ResourceLoader {
    async fn request(&self, req: Request) -> Result<Response, NetError> {
        tracing::info!("HTTP GET {}", req.url);

        let client = self.client.clone();
        smol::unblock(move || send_blocking(&client, req)).await
    }
}

fn send_blocking(client: &reqwest::blocking::Client, req: Request) -> Result<Response, NetError> {
    let mut builder = client.get(&req.url);
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let response = builder.send().map_err(|e| NetError::Network(e.to_string()))?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = response.bytes().map_err(|e| NetError::Network(e.to_string()))?.to_vec();

    tracing::debug!("HTTP GET {} -> {} ({} bytes)", req.url, status, body.len());
    Ok(Response { status, headers, body })
}
