//! Load cycle errors

use loadmore_dom::DomError;
use loadmore_net::NetError;

/// Why a fetch cycle (or a call on the controller) failed
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Request, HTTP status or payload decoding failed
    #[error(transparent)]
    Net(#[from] NetError),

    /// A parsed post could not be inserted
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    /// Posts arrived but the container selector matched nothing
    #[error("no container element to append posts to")]
    MissingContainer,

    /// The trigger selector matched nothing at construction time
    #[error("controller is inert: no trigger element matched `{0}`")]
    Inert(String),

    #[error("unknown event name `{0}`")]
    UnknownEvent(String),
}
