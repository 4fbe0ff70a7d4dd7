//! LoadMore controller
//!
//! Binds a trigger element in a [`SharedDocument`] to the content endpoint.
//! Each click runs one fetch cycle on a [`smol::LocalExecutor`]: the next
//! page is requested, its markup parsed and appended to the container, and
//! the trigger is removed once the server reports nothing more.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use loadmore_dom::{dispatch_event, DomEvent, ElementData, EventType, Listener, ListenerId, NodeId, SharedDocument};
use loadmore_html::HtmlParser;
use loadmore_net::{fetch_json, resolve, Transport};
use serde::{Deserialize, Deserializer};
use smol::LocalExecutor;

use crate::events::{EventChannel, EventName, LoadMoreEvent, SubscriptionId};
use crate::filters::{NoFilters, RequestFilters};
use crate::options::{Options, UserOptions};
use crate::LoadError;

/// Class set on the trigger while a cycle is in flight
pub const BUSY_CLASS: &str = "busy";

/// Body of a load-more response.
///
/// Absent and `null` fields read as empty markup and "no more pages".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostsPayload {
    /// Markup fragment holding the page's posts
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts: String,
    /// Whether another page exists
    #[serde(default, deserialize_with = "null_as_default")]
    pub more: bool,
}

fn null_as_default<'de, D, V>(deserializer: D) -> Result<V, D::Error>
where
    D: Deserializer<'de>,
    V: Default + Deserialize<'de>,
{
    Ok(Option::<V>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where a controller is in its click cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Busy,
    /// Terminal; the trigger has been removed
    Exhausted,
}

/// Result of one click cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// Posts appended, trigger kept
    More,
    /// Server reported no further content
    Exhausted,
    /// The cycle failed and the controller is now exhausted
    Failed(LoadError),
    /// Click arrived while busy or exhausted, or the controller is inert
    Ignored,
}

/// The load-more widget.
///
/// Construction never fails: if the trigger selector matches nothing the
/// instance is inert and every operation is a no-op.
///
/// The click listener holds only a weak reference, so the widget stops
/// reacting once this value is dropped.
pub struct LoadMore<T, F = NoFilters> {
    options: Options,
    inner: Option<Rc<Inner<T, F>>>,
}

struct Inner<T, F> {
    document: SharedDocument,
    transport: T,
    filters: F,
    parser: HtmlParser,
    button: NodeId,
    container: Option<NodeId>,
    current_page: Cell<u32>,
    state: Cell<CycleState>,
    events: EventChannel,
    click_listener: Cell<Option<ListenerId>>,
}

impl<T> LoadMore<T, NoFilters>
where
    T: Transport + 'static,
{
    /// Bind to `document` with the default request path
    pub fn new(
        document: SharedDocument,
        transport: T,
        executor: Rc<LocalExecutor<'static>>,
        user_options: UserOptions,
    ) -> Self {
        Self::with_filters(document, transport, NoFilters, executor, user_options)
    }
}

impl<T, F> LoadMore<T, F>
where
    T: Transport + 'static,
    F: RequestFilters + 'static,
{
    /// Bind to `document`, building request paths through `filters`.
    ///
    /// Cycles started by clicks are spawned onto `executor`; whoever owns it
    /// must keep ticking it for them to progress.
    pub fn with_filters(
        document: SharedDocument,
        transport: T,
        mut filters: F,
        executor: Rc<LocalExecutor<'static>>,
        user_options: UserOptions,
    ) -> Self {
        let options = Options::resolve(user_options);

        let (button, container) = {
            let doc = document.borrow();
            let Some(button) = doc.query_selector(&options.button_selector) else {
                tracing::debug!("no trigger matches `{}`; load more disabled", options.button_selector);
                return Self { options, inner: None };
            };
            let container = doc.query_selector(&options.container_selector);
            if container.is_none() {
                tracing::debug!("no container matches `{}`", options.container_selector);
            }
            filters.initialize_filters(&doc, button);
            (button, container)
        };

        let inner = Rc::new(Inner {
            document,
            transport,
            filters,
            parser: HtmlParser::new(),
            button,
            container,
            current_page: Cell::new(0),
            state: Cell::new(CycleState::Idle),
            events: EventChannel::new(),
            click_listener: Cell::new(None),
        });
        inner.listen(executor);

        Self { options, inner: Some(inner) }
    }
}

impl<T, F> LoadMore<T, F>
where
    T: Transport,
    F: RequestFilters,
{
    /// True when no trigger was found at construction
    pub fn is_inert(&self) -> bool {
        self.inner.is_none()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Pages requested so far
    pub fn current_page(&self) -> Option<u32> {
        self.inner.as_ref().map(|inner| inner.current_page.get())
    }

    pub fn state(&self) -> Option<CycleState> {
        self.inner.as_ref().map(|inner| inner.state.get())
    }

    /// Trigger element found at construction, even if since removed
    pub fn button(&self) -> Option<NodeId> {
        self.inner.as_ref().map(|inner| inner.button)
    }

    pub fn container(&self) -> Option<NodeId> {
        self.inner.as_ref().and_then(|inner| inner.container)
    }

    /// Subscribe to `name`; `None` on an inert instance
    pub fn on<L>(&self, name: EventName, listener: L) -> Option<SubscriptionId>
    where
        L: Fn(&LoadMoreEvent<'_>) + 'static,
    {
        self.inner.as_ref().map(|inner| inner.events.on(name, listener))
    }

    /// Subscribe to the next `name` event only
    pub fn once<L>(&self, name: EventName, listener: L) -> Option<SubscriptionId>
    where
        L: Fn(&LoadMoreEvent<'_>) + 'static,
    {
        self.inner.as_ref().map(|inner| inner.events.once(name, listener))
    }

    /// Subscribe by wire name such as `"post:append"`
    pub fn on_named<L>(&self, name: &str, listener: L) -> Result<Option<SubscriptionId>, LoadError>
    where
        L: Fn(&LoadMoreEvent<'_>) + 'static,
    {
        let name: EventName = name.parse()?;
        Ok(self.on(name, listener))
    }

    pub fn off(&self, id: SubscriptionId) -> bool {
        self.inner.as_ref().is_some_and(|inner| inner.events.off(id))
    }

    /// Fetch the next page and append its posts.
    ///
    /// Resolves to whether more pages remain. Does not touch the trigger and
    /// does not emit cycle events; see [`on_click`](Self::on_click).
    pub async fn get_more_posts(&self) -> Result<bool, LoadError> {
        self.require_inner()?.get_more_posts().await
    }

    /// Parse `markup` and append the resulting elements to the container
    pub fn parse_and_append_posts(&self, markup: &str) -> Result<Vec<NodeId>, LoadError> {
        self.require_inner()?.parse_and_append_posts(markup)
    }

    /// Append `posts` to the container in order
    pub fn append_posts(&self, posts: &[NodeId]) -> Result<(), LoadError> {
        self.require_inner()?.append_posts(posts)
    }

    /// Run one click cycle to completion on the current task
    pub async fn on_click(&self) -> CycleOutcome {
        match &self.inner {
            Some(inner) => inner.on_click().await,
            None => CycleOutcome::Ignored,
        }
    }

    fn require_inner(&self) -> Result<&Inner<T, F>, LoadError> {
        self.inner
            .as_deref()
            .ok_or_else(|| LoadError::Inert(self.options.button_selector.clone()))
    }
}

impl<T, F> Drop for LoadMore<T, F> {
    fn drop(&mut self) {
        let Some(inner) = &self.inner else { return };
        let Some(id) = inner.click_listener.take() else { return };
        if let Ok(mut doc) = inner.document.try_borrow_mut() {
            doc.listeners_mut().remove(id);
        }
    }
}

impl<T, F> fmt::Debug for LoadMore<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("LoadMore");
        s.field("options", &self.options);
        match &self.inner {
            Some(inner) => s
                .field("button", &inner.button)
                .field("container", &inner.container)
                .field("current_page", &inner.current_page.get())
                .field("state", &inner.state.get())
                .field("events", &inner.events),
            None => s.field("inert", &true),
        };
        s.finish()
    }
}

impl<T, F> Inner<T, F>
where
    T: Transport + 'static,
    F: RequestFilters + 'static,
{
    fn listen(self: &Rc<Self>, executor: Rc<LocalExecutor<'static>>) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let listener: Listener = Rc::new(move |_: &mut DomEvent| {
            let Some(inner) = weak.upgrade() else { return };
            executor
                .spawn(async move {
                    inner.on_click().await;
                })
                .detach();
        });
        let id = self
            .document
            .borrow_mut()
            .listeners_mut()
            .add(self.button, EventType::Click, listener);
        self.click_listener.set(Some(id));
    }
}

impl<T, F> Inner<T, F>
where
    T: Transport,
    F: RequestFilters,
{
    async fn on_click(&self) -> CycleOutcome {
        match self.state.get() {
            CycleState::Idle => {}
            CycleState::Busy => {
                tracing::debug!("click ignored: page {} still loading", self.current_page.get());
                return CycleOutcome::Ignored;
            }
            CycleState::Exhausted => {
                tracing::debug!("click ignored: no more posts");
                return CycleOutcome::Ignored;
            }
        }

        self.state.set(CycleState::Busy);
        self.with_button(|button| {
            button.add_class(BUSY_CLASS);
        });
        self.events.emit(&LoadMoreEvent::LoadStart);

        let outcome = match self.get_more_posts().await {
            Ok(more) => {
                self.release_button();
                if more {
                    self.state.set(CycleState::Idle);
                    CycleOutcome::More
                } else {
                    self.exhaust();
                    CycleOutcome::Exhausted
                }
            }
            Err(error) => {
                self.events.emit(&LoadMoreEvent::LoadError { error: &error });
                self.exhaust();
                CycleOutcome::Failed(error)
            }
        };

        self.events.emit(&LoadMoreEvent::LoadFinish);
        outcome
    }

    async fn get_more_posts(&self) -> Result<bool, LoadError> {
        let page = self.current_page.get() + 1;
        self.current_page.set(page);

        let result = self.load_page(page).await;
        if let Err(error) = &result {
            tracing::warn!("failed to load page {}: {}", page, error);
        }
        result
    }

    async fn load_page(&self, page: u32) -> Result<bool, LoadError> {
        let path = self.filters.build_request_path(page);
        let url = resolve(self.document.borrow().url(), &path)?;
        tracing::info!("requesting page {} from {}", page, url);

        let payload: PostsPayload = fetch_json(&self.transport, url.as_str()).await?;
        let posts = self.parse_and_append_posts(&payload.posts)?;
        tracing::debug!("page {}: {} post(s), more = {}", page, posts.len(), payload.more);
        Ok(payload.more)
    }

    fn parse_and_append_posts(&self, markup: &str) -> Result<Vec<NodeId>, LoadError> {
        let posts = {
            let mut doc = self.document.borrow_mut();
            self.parser.parse_body_children(markup, doc.tree_mut())
        };
        self.events.emit(&LoadMoreEvent::PostsParsed { posts: &posts });
        self.append_posts(&posts)?;
        Ok(posts)
    }

    fn append_posts(&self, posts: &[NodeId]) -> Result<(), LoadError> {
        for &post in posts {
            let container = self.container.ok_or(LoadError::MissingContainer)?;
            self.document.borrow_mut().tree_mut().append_child(container, post)?;
            self.events.emit(&LoadMoreEvent::PostAppend { post });
        }
        Ok(())
    }

    /// Clear the busy state and drop focus from the trigger
    fn release_button(&self) {
        self.with_button(|button| {
            button.remove_class(BUSY_CLASS);
        });
        let had_focus = self.document.borrow_mut().blur(self.button);
        if had_focus {
            dispatch_event(&self.document, DomEvent::blur(self.button));
        }
    }

    fn exhaust(&self) {
        self.state.set(CycleState::Exhausted);
        let removed = {
            let mut doc = self.document.borrow_mut();
            doc.blur(self.button);
            doc.tree_mut().detach(self.button)
        };
        if removed {
            tracing::debug!("trigger {} removed", self.button);
        }
        self.events.emit(&LoadMoreEvent::PostsEnd);
    }

    fn with_button(&self, f: impl FnOnce(&mut ElementData)) {
        let mut doc = self.document.borrow_mut();
        if let Some(button) = doc.tree_mut().element_mut(self.button) {
            f(button);
        }
    }
}
