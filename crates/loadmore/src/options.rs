//! Widget configuration

use serde::{Deserialize, Serialize};

/// Trigger selector used when none is supplied
pub const DEFAULT_BUTTON_SELECTOR: &str = ".ghwp-load-more button";

/// Container selector used when none is supplied
pub const DEFAULT_CONTAINER_SELECTOR: &str = ".ghwp-latest-posts";

/// Resolved configuration, fixed for the lifetime of a controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// The button triggering the loading operations
    pub button_selector: String,
    /// The container that retrieved posts are appended to
    pub container_selector: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            button_selector: DEFAULT_BUTTON_SELECTOR.to_string(),
            container_selector: DEFAULT_CONTAINER_SELECTOR.to_string(),
        }
    }
}

impl Options {
    /// Overlay caller-supplied fields onto the defaults.
    ///
    /// Selectors are not validated here; one that matches nothing simply
    /// leaves the corresponding element unbound.
    pub fn resolve(user: UserOptions) -> Self {
        let defaults = Self::default();
        Self {
            button_selector: user.button_selector.unwrap_or(defaults.button_selector),
            container_selector: user.container_selector.unwrap_or(defaults.container_selector),
        }
    }
}

/// Caller-supplied, partial configuration.
///
/// Deserializes from `{ "buttonSelector": ..., "containerSelector": ... }`;
/// both keys are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOptions {
    #[serde(default, alias = "button_selector")]
    pub button_selector: Option<String>,
    #[serde(default, alias = "container_selector")]
    pub container_selector: Option<String>,
}

impl UserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button_selector(mut self, selector: &str) -> Self {
        self.button_selector = Some(selector.to_string());
        self
    }

    pub fn container_selector(mut self, selector: &str) -> Self {
        self.container_selector = Some(selector.to_string());
        self
    }

    /// Parse from a JSON object
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_user_options_give_defaults() {
        assert_eq!(Options::resolve(UserOptions::new()), Options::default());
        assert_eq!(Options::default().button_selector, ".ghwp-load-more button");
        assert_eq!(Options::default().container_selector, ".ghwp-latest-posts");
    }

    #[test]
    fn test_overlay_single_field() {
        let options = Options::resolve(UserOptions::new().container_selector("#feed"));

        assert_eq!(options.button_selector, DEFAULT_BUTTON_SELECTOR);
        assert_eq!(options.container_selector, "#feed");
    }

    #[test]
    fn test_from_json() {
        let user = UserOptions::from_json(r##"{"buttonSelector": "#more"}"##).unwrap();
        assert_eq!(user, UserOptions::new().button_selector("#more"));

        let user = UserOptions::from_json(r#"{"container_selector": ".feed"}"#).unwrap();
        assert_eq!(user.container_selector.as_deref(), Some(".feed"));

        assert_eq!(UserOptions::from_json("{}").unwrap(), UserOptions::new());
        assert!(UserOptions::from_json(r#"{"buttonSelector": 3}"#).is_err());
    }
}
