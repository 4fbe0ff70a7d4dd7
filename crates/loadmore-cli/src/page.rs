//! Host page loading

use anyhow::{bail, Context, Result};
use loadmore_dom::SharedDocument;
use loadmore_html::HtmlParser;
use loadmore_net::ResourceLoader;

/// Where the host page comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Remote(String),
    /// Local file, given the URL its requests resolve against
    File { path: String, base_url: String },
}

impl PageSource {
    /// `http(s)://` sources are fetched; anything else is read from disk
    pub fn from_arg(source: &str, base_url: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::Remote(source.to_string())
        } else {
            Self::File {
                path: source.to_string(),
                base_url: base_url.to_string(),
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Remote(url) => url,
            Self::File { base_url, .. } => base_url,
        }
    }

    /// Fetch or read the page and parse it into a shared document
    pub fn load(&self, loader: &ResourceLoader) -> Result<SharedDocument> {
        let html = match self {
            Self::Remote(url) => {
                let response = smol::block_on(loader.fetch(url)).with_context(|| format!("fetching {url}"))?;
                if !response.ok() {
                    bail!("fetching {url}: HTTP {}", response.status());
                }
                response.text().with_context(|| format!("decoding {url}"))?
            }
            Self::File { path, .. } => std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?,
        };

        let document = HtmlParser::new().parse_with_url(&html, self.url());
        tracing::info!("loaded {} ({} nodes)", self.url(), document.tree().len());
        Ok(document.into_shared())
    }
}
