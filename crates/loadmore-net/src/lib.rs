//! loadmore Networking
//!
//! Request/JSON-response exchange with the content endpoint.

pub mod fetch;
pub mod loader;

use std::future::Future;

pub use fetch::{fetch_json, FetchResponse};
pub use loader::{Request, ResourceLoader};
pub use url::Url;

/// HTTP Response
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Something that can carry a [`Request`] to a server.
///
/// Implemented by [`ResourceLoader`] for real HTTP; tests and embedders can
/// supply their own.
pub trait Transport {
    /// Perform one request; there is no retry and no cancellation
    fn request(&self, req: Request) -> impl Future<Output = Result<Response, NetError>>;
}

/// Resolve a request path against a document URL, the way `fetch()` resolves
/// relative paths against the page it runs in
pub fn resolve(base: &str, path: &str) -> Result<Url, NetError> {
    let base = Url::parse(base).map_err(|e| NetError::InvalidUrl(format!("{base}: {e}")))?;
    base.join(path).map_err(|e| NetError::InvalidUrl(format!("{path}: {e}")))
}
