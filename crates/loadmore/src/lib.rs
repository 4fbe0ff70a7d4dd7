//! loadmore - Incremental "load more" pagination
//!
//! A [`LoadMore`] controller turns a trigger element into a pager: each click
//! fetches the next page from the content endpoint, appends the returned
//! posts to a container and removes the trigger once the server has nothing
//! more.
//!
//! ```no_run
//! use std::rc::Rc;
//! use loadmore::{EventName, LoadMore, LoadMoreEvent, UserOptions};
//! use loadmore_net::ResourceLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = loadmore_html::HtmlParser::new()
//!     .parse_with_url("<div class=\"ghwp-latest-posts\"></div>", "https://example.test/")
//!     .into_shared();
//! let executor = Rc::new(smol::LocalExecutor::new());
//! let widget = LoadMore::new(document, ResourceLoader::new()?, executor, UserOptions::new());
//!
//! widget.on(EventName::PostAppend, |event: &LoadMoreEvent<'_>| {
//!     if let LoadMoreEvent::PostAppend { post } = event {
//!         println!("appended {post}");
//!     }
//! });
//! # Ok(())
//! # }
//! ```

mod controller;
mod error;
pub mod events;
pub mod filters;
pub mod options;

pub use controller::{BUSY_CLASS, CycleOutcome, CycleState, LoadMore, PostsPayload};
pub use error::LoadError;
pub use events::{EventChannel, EventName, LoadMoreEvent, SubscriptionId};
pub use filters::{NoFilters, QueryFilters, RequestFilters, DEFAULT_ENDPOINT};
pub use options::{Options, UserOptions};
