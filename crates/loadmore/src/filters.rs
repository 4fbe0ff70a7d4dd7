//! Request filter hooks
//!
//! A controller asks its [`RequestFilters`] for the path of every page it
//! fetches. [`NoFilters`] produces the bare endpoint; [`QueryFilters`] adds
//! query parameters captured from the trigger element.

use loadmore_dom::{Document, NodeId};
use url::form_urlencoded;

/// Content endpoint, relative to the document origin
pub const DEFAULT_ENDPOINT: &str = "/wp-json/ghwapp/v1/posts/load-more";

/// Attribute prefix [`QueryFilters`] collects from the trigger
pub const FILTER_ATTR_PREFIX: &str = "data-filter-";

/// `/wp-json/ghwapp/v1/posts/load-more?page=<page>`
pub fn default_request_path(page: u32) -> String {
    format!("{DEFAULT_ENDPOINT}?page={page}")
}

/// Extension points consulted by a controller.
///
/// Both methods have defaults; implementors override what they need.
pub trait RequestFilters {
    /// Called once, at the end of controller initialization
    fn initialize_filters(&mut self, _document: &Document, _trigger: NodeId) {}

    /// Path (and query) requested for `page`
    fn build_request_path(&self, page: u32) -> String {
        default_request_path(page)
    }
}

/// No filtering; every page goes to [`DEFAULT_ENDPOINT`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilters;

impl RequestFilters for NoFilters {}

/// Appends fixed `key=value` parameters to every request.
///
/// Parameters come from [`with`](Self::with) and from `data-filter-<key>`
/// attributes on the trigger, read at initialization. `page` always comes
/// first in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilters {
    params: Vec<(String, String)>,
}

impl QueryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter; a later value for the same key replaces it
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.params.push((key.to_string(), value.to_string())),
        }
    }
}

impl RequestFilters for QueryFilters {
    fn initialize_filters(&mut self, document: &Document, trigger: NodeId) {
        let Some(element) = document.tree().element(trigger) else {
            return;
        };
        let found: Vec<(String, String)> = element
            .attrs()
            .iter()
            .filter_map(|attr| {
                let key = attr.name.strip_prefix(FILTER_ATTR_PREFIX)?;
                (!key.is_empty()).then(|| (key.to_string(), attr.value.clone()))
            })
            .collect();

        for (key, value) in &found {
            tracing::debug!("filter {}={} from trigger", key, value);
            self.set(key, value);
        }
    }

    fn build_request_path(&self, page: u32) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("page", &page.to_string());
        for (key, value) in &self.params {
            query.append_pair(key, value);
        }
        format!("{DEFAULT_ENDPOINT}?{}", query.finish())
    }
}
