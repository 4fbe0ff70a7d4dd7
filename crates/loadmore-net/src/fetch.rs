//! Fetch API
//!
//! `fetch(path).then(res => res.json())` for Rust callers.

use serde::de::DeserializeOwned;

use crate::{NetError, Request, Response, Transport};

/// Fetch response with convenience methods
#[derive(Debug, Clone)]
pub struct FetchResponse {
    inner: Response,
}

impl FetchResponse {
    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.inner.status
    }

    /// Check if response is OK (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.inner.status)
    }

    /// Get header value (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get body as text
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.inner.body.clone()).map_err(|e| NetError::Network(e.to_string()))
    }

    /// Get body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NetError> {
        Ok(serde_json::from_slice(&self.inner.body)?)
    }
}

impl From<Response> for FetchResponse {
    fn from(inner: Response) -> Self {
        Self { inner }
    }
}

/// GET `url` and decode the JSON body.
///
/// Non-2xx statuses are errors; the body is not inspected for them.
pub async fn fetch_json<T, R>(transport: &R, url: &str) -> Result<T, NetError>
where
    T: DeserializeOwned,
    R: Transport,
{
    let request = Request::get(url).with_header("Accept", "application/json");
    let response = FetchResponse::from(transport.request(request).await?);
    if !response.ok() {
        return Err(NetError::HttpError { status: response.status() });
    }
    response.json()
}
