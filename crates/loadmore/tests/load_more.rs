//! Click-cycle tests for the load-more controller
//!
//! A scripted transport stands in for the content endpoint; clicks are
//! dispatched through the document and the spawned cycles driven with
//! `LocalExecutor::try_tick`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use loadmore::*;
use loadmore_dom::{dispatch_event, DomEvent, EventType, NodeId, SharedDocument};
use loadmore_html::HtmlParser;
use loadmore_net::{NetError, Request, Response, Transport};
use pretty_assertions::assert_eq;
use smol::LocalExecutor;

const PAGE: &str = r#"<!doctype html>
<html>
<head><title>Latest posts</title></head>
<body>
  <div class="ghwp-latest-posts"></div>
  <div class="ghwp-load-more">
    <button type="button" data-filter-category="news">Load more</button>
  </div>
</body>
</html>"#;

const ENDPOINT: &str = "https://example.test/wp-json/ghwapp/v1/posts/load-more";

type Log = Rc<RefCell<Vec<String>>>;

enum Reply {
    Json(&'static str),
    Status(u16),
    Offline,
}

/// Answers requests from a queue of replies, recording every URL
struct Scripted {
    replies: RefCell<VecDeque<Reply>>,
    requested: Log,
}

impl Scripted {
    fn new(replies: impl IntoIterator<Item = Reply>) -> (Self, Log) {
        let requested = Log::default();
        let transport = Self {
            replies: RefCell::new(replies.into_iter().collect()),
            requested: Rc::clone(&requested),
        };
        (transport, requested)
    }
}

impl Transport for Scripted {
    async fn request(&self, req: Request) -> Result<Response, NetError> {
        self.requested.borrow_mut().push(req.url.clone());
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            Some(Reply::Json(body)) => Ok(response(200, body)),
            Some(Reply::Status(status)) => Ok(response(status, "")),
            Some(Reply::Offline) | None => Err(NetError::Network(format!("unreachable: {}", req.url))),
        }
    }
}

/// Holds every request until the test releases it
struct Gated {
    gate: smol::channel::Receiver<()>,
    requested: Log,
}

impl Transport for Gated {
    async fn request(&self, req: Request) -> Result<Response, NetError> {
        self.requested.borrow_mut().push(req.url);
        let _ = self.gate.recv().await;
        Ok(response(200, r#"{"posts":"<article>late</article>","more":true}"#))
    }
}

fn response(status: u16, body: &str) -> Response {
    Response {
        status,
        headers: vec![("Content-Type".into(), "application/json".into())],
        body: body.as_bytes().to_vec(),
    }
}

fn page() -> (SharedDocument, Rc<LocalExecutor<'static>>) {
    let document = HtmlParser::new()
        .parse_with_url(PAGE, "https://example.test/blog/")
        .into_shared();
    (document, Rc::new(LocalExecutor::new()))
}

/// Record the wire name of every event the widget emits
fn record<T: Transport, F: RequestFilters>(widget: &LoadMore<T, F>) -> Log {
    let log = Log::default();
    for name in EventName::ALL {
        let log = Rc::clone(&log);
        widget
            .on(name, move |event: &LoadMoreEvent<'_>| log.borrow_mut().push(event.name().to_string()))
            .unwrap();
    }
    log
}

fn click(document: &SharedDocument, executor: &LocalExecutor<'static>, target: NodeId) {
    dispatch_event(document, DomEvent::click(target));
    while executor.try_tick() {}
}

fn container_children(document: &SharedDocument, container: NodeId) -> Vec<String> {
    let doc = document.borrow();
    doc.tree()
        .element_children(container)
        .into_iter()
        .map(|id| doc.tree().outer_html(id))
        .collect()
}

fn page_url(page: u32) -> String {
    format!("{ENDPOINT}?page={page}")
}

#[test]
fn test_click_appends_posts_and_keeps_trigger() {
    let (document, executor) = page();
    let (transport, requested) =
        Scripted::new([Reply::Json(r#"{"posts":"<article>A</article><article>B</article>","more":true}"#)]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let events = record(&widget);

    let parsed = Rc::new(RefCell::new(Vec::new()));
    let appended = Rc::new(RefCell::new(Vec::new()));
    {
        let parsed = Rc::clone(&parsed);
        widget.on(EventName::PostsParsed, move |event| {
            if let LoadMoreEvent::PostsParsed { posts } = event {
                parsed.borrow_mut().push(posts.to_vec());
            }
        });
        let appended = Rc::clone(&appended);
        widget.on(EventName::PostAppend, move |event| {
            if let LoadMoreEvent::PostAppend { post } = event {
                appended.borrow_mut().push(*post);
            }
        });
    }

    let button = widget.button().unwrap();
    let container = widget.container().unwrap();
    assert!(container_children(&document, container).is_empty());

    click(&document, &executor, button);

    assert_eq!(
        container_children(&document, container),
        vec!["<article>A</article>", "<article>B</article>"]
    );
    assert_eq!(
        *events.borrow(),
        vec!["load:start", "posts:parsed", "post:append", "post:append", "load:finish"]
    );
    assert_eq!(parsed.borrow().len(), 1);
    assert_eq!(parsed.borrow()[0].len(), 2);
    assert_eq!(*appended.borrow(), parsed.borrow()[0]);

    let doc = document.borrow();
    assert!(doc.tree().is_connected(button));
    assert!(!doc.tree().element(button).unwrap().has_class(BUSY_CLASS));
    assert_eq!(widget.state(), Some(CycleState::Idle));
    assert_eq!(*requested.borrow(), vec![page_url(1)]);
}

#[test]
fn test_exhaustion_removes_trigger() {
    let (document, executor) = page();
    let (transport, requested) = Scripted::new([Reply::Json(r#"{"posts":"","more":false}"#)]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let events = record(&widget);
    let button = widget.button().unwrap();
    let container = widget.container().unwrap();

    click(&document, &executor, button);

    assert!(container_children(&document, container).is_empty());
    assert_eq!(*events.borrow(), vec!["load:start", "posts:parsed", "posts:end", "load:finish"]);
    assert!(!document.borrow().tree().is_connected(button));
    assert!(document.borrow().query_selector(".ghwp-load-more button").is_none());
    assert_eq!(widget.state(), Some(CycleState::Exhausted));

    // A stray click on the detached trigger starts nothing
    click(&document, &executor, button);
    assert_eq!(events.borrow().len(), 4);
    assert_eq!(requested.borrow().len(), 1);
}

#[test]
fn test_missing_trigger_gives_inert_widget() {
    let (document, executor) = page();
    let (transport, requested) = Scripted::new([]);
    let widget = LoadMore::new(
        Rc::clone(&document),
        transport,
        Rc::clone(&executor),
        UserOptions::new().button_selector("#no-such-button"),
    );

    assert!(widget.is_inert());
    assert_eq!(widget.current_page(), None);
    assert_eq!(widget.button(), None);
    assert!(widget.on(EventName::LoadStart, |_| {}).is_none());
    assert!(matches!(smol::block_on(widget.get_more_posts()), Err(LoadError::Inert(_))));
    assert!(matches!(smol::block_on(widget.on_click()), CycleOutcome::Ignored));

    let real_button = document.borrow().query_selector("button").unwrap();
    assert_eq!(document.borrow().listeners().count(real_button, EventType::Click), 0);
    click(&document, &executor, real_button);
    assert!(requested.borrow().is_empty());
}

#[test]
fn test_page_index_counts_every_cycle() {
    let (document, executor) = page();
    let (transport, requested) = Scripted::new([
        Reply::Json(r#"{"posts":"<article>1</article>","more":true}"#),
        Reply::Json(r#"{"posts":"<article>2</article>","more":true}"#),
        Reply::Json(r#"{"posts":"<article>3</article>","more":false}"#),
    ]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let button = widget.button().unwrap();

    for _ in 0..3 {
        click(&document, &executor, button);
    }

    assert_eq!(widget.current_page(), Some(3));
    assert_eq!(*requested.borrow(), vec![page_url(1), page_url(2), page_url(3)]);
    assert_eq!(
        container_children(&document, widget.container().unwrap()),
        vec!["<article>1</article>", "<article>2</article>", "<article>3</article>"]
    );
}

#[test]
fn test_trigger_stays_usable_while_more_remains() {
    let (document, executor) = page();
    let (transport, requested) = Scripted::new([
        Reply::Json(r#"{"posts":"<article>1</article>","more":true}"#),
        Reply::Json(r#"{"posts":"<article>2</article>","more":true}"#),
        Reply::Json(r#"{"posts":"<article>3</article>","more":true}"#),
    ]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let button = widget.button().unwrap();

    for cycle in 1..=3 {
        click(&document, &executor, button);

        assert_eq!(widget.current_page(), Some(cycle));
        assert_eq!(widget.state(), Some(CycleState::Idle));
        let doc = document.borrow();
        assert!(doc.tree().is_connected(button));
        assert_eq!(doc.query_selector(".ghwp-load-more button"), Some(button));
        assert!(!doc.tree().element(button).unwrap().has_class(BUSY_CLASS));
        assert_eq!(doc.listeners().count(button, EventType::Click), 1);
    }

    assert_eq!(*requested.borrow(), vec![page_url(1), page_url(2), page_url(3)]);
    assert_eq!(container_children(&document, widget.container().unwrap()).len(), 3);
}

#[test]
fn test_null_payload_fields_are_lenient() {
    let (document, executor) = page();
    let (transport, _) = Scripted::new([Reply::Json(r#"{"posts":null,"more":true}"#)]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());

    assert!(matches!(smol::block_on(widget.on_click()), CycleOutcome::More));
    assert_eq!(widget.state(), Some(CycleState::Idle));
}

#[test]
fn test_click_while_busy_is_ignored() {
    let (document, executor) = page();
    let (release, gate) = smol::channel::unbounded();
    let requested = Log::default();
    let transport = Gated { gate, requested: Rc::clone(&requested) };
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let starts = Rc::new(Cell::new(0));
    {
        let starts = Rc::clone(&starts);
        widget.on(EventName::LoadStart, move |_| starts.set(starts.get() + 1));
    }
    let button = widget.button().unwrap();

    click(&document, &executor, button);
    click(&document, &executor, button);

    assert_eq!(widget.state(), Some(CycleState::Busy));
    assert!(document.borrow().tree().element(button).unwrap().has_class(BUSY_CLASS));
    assert_eq!(requested.borrow().len(), 1);
    assert_eq!(starts.get(), 1);

    release.try_send(()).unwrap();
    while executor.try_tick() {}

    assert_eq!(widget.state(), Some(CycleState::Idle));
    assert_eq!(widget.current_page(), Some(1));
    assert_eq!(container_children(&document, widget.container().unwrap()), vec!["<article>late</article>"]);
}

#[test]
fn test_http_failure_is_reported_then_exhausts() {
    let (document, executor) = page();
    let (transport, _) = Scripted::new([Reply::Status(500)]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let events = record(&widget);
    let errors = Log::default();
    {
        let errors = Rc::clone(&errors);
        widget.on(EventName::LoadError, move |event| {
            if let LoadMoreEvent::LoadError { error } = event {
                errors.borrow_mut().push(error.to_string());
            }
        });
    }
    let button = widget.button().unwrap();

    click(&document, &executor, button);

    assert_eq!(*events.borrow(), vec!["load:start", "load:error", "posts:end", "load:finish"]);
    assert_eq!(*errors.borrow(), vec!["HTTP error: 500"]);
    assert!(!document.borrow().tree().is_connected(button));
    assert_eq!(widget.current_page(), Some(1));
    assert_eq!(widget.state(), Some(CycleState::Exhausted));
}

#[test]
fn test_failures_are_distinguishable_from_exhaustion() {
    let (document, executor) = page();
    let (transport, _) = Scripted::new([Reply::Json("<html>maintenance</html>")]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let outcome = smol::block_on(widget.on_click());
    assert!(matches!(outcome, CycleOutcome::Failed(LoadError::Net(NetError::Json(_)))));

    let (document, executor) = page();
    let (transport, _) = Scripted::new([Reply::Offline]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let outcome = smol::block_on(widget.on_click());
    assert!(matches!(outcome, CycleOutcome::Failed(LoadError::Net(NetError::Network(_)))));

    let (document, executor) = page();
    let (transport, _) = Scripted::new([Reply::Json(r#"{"more":false}"#)]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    assert!(matches!(smol::block_on(widget.on_click()), CycleOutcome::Exhausted));
}

#[test]
fn test_missing_container() {
    let (document, executor) = page();
    let (transport, _) = Scripted::new([
        Reply::Json(r#"{"posts":"","more":true}"#),
        Reply::Json(r#"{"posts":"<article>A</article>","more":true}"#),
    ]);
    let widget = LoadMore::new(
        Rc::clone(&document),
        transport,
        Rc::clone(&executor),
        UserOptions::new().container_selector(".no-such-list"),
    );
    assert!(!widget.is_inert());
    assert_eq!(widget.container(), None);

    assert!(matches!(smol::block_on(widget.on_click()), CycleOutcome::More));
    assert!(matches!(
        smol::block_on(widget.on_click()),
        CycleOutcome::Failed(LoadError::MissingContainer)
    ));
    assert_eq!(widget.current_page(), Some(2));
}

#[test]
fn test_query_filters_from_trigger() {
    let (document, executor) = page();
    let (transport, requested) = Scripted::new([Reply::Json(r#"{"posts":"","more":true}"#)]);
    let widget = LoadMore::with_filters(
        Rc::clone(&document),
        transport,
        QueryFilters::new().with("per_page", "6"),
        Rc::clone(&executor),
        UserOptions::new(),
    );

    click(&document, &executor, widget.button().unwrap());

    assert_eq!(*requested.borrow(), vec![format!("{ENDPOINT}?page=1&per_page=6&category=news")]);
}

#[test]
fn test_custom_filters_hook() {
    struct Tagged {
        tag: String,
    }

    impl RequestFilters for Tagged {
        fn initialize_filters(&mut self, document: &loadmore_dom::Document, trigger: NodeId) {
            self.tag = document.tree().text_content(trigger).trim().replace(' ', "-");
        }

        fn build_request_path(&self, page: u32) -> String {
            format!("/feed/{}/{page}.json", self.tag)
        }
    }

    let (document, executor) = page();
    let (transport, requested) = Scripted::new([Reply::Json(r#"{"posts":"","more":true}"#)]);
    let widget = LoadMore::with_filters(
        Rc::clone(&document),
        transport,
        Tagged { tag: String::new() },
        Rc::clone(&executor),
        UserOptions::new(),
    );

    assert_eq!(smol::block_on(widget.get_more_posts()).unwrap(), true);
    assert_eq!(*requested.borrow(), vec!["https://example.test/feed/Load-more/1.json"]);
}

#[test]
fn test_get_more_posts_skips_cycle_events() {
    let (document, executor) = page();
    let (transport, _) = Scripted::new([Reply::Json(r#"{"posts":"<p>x</p>","more":false}"#)]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let events = record(&widget);

    assert_eq!(smol::block_on(widget.get_more_posts()).unwrap(), false);
    assert_eq!(*events.borrow(), vec!["posts:parsed", "post:append"]);
    assert!(document.borrow().tree().is_connected(widget.button().unwrap()));
    assert_eq!(widget.state(), Some(CycleState::Idle));
}

#[test]
fn test_trigger_loses_focus_after_cycle() {
    let (document, executor) = page();
    let (transport, _) = Scripted::new([Reply::Json(r#"{"posts":"","more":true}"#)]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let button = widget.button().unwrap();
    let blurs = Rc::new(Cell::new(0));
    {
        let blurs = Rc::clone(&blurs);
        let mut doc = document.borrow_mut();
        doc.listeners_mut()
            .add(button, EventType::Blur, Rc::new(move |_: &mut DomEvent| blurs.set(blurs.get() + 1)));
        assert!(doc.focus(button));
    }

    click(&document, &executor, button);

    assert_eq!(document.borrow().active_element(), None);
    assert_eq!(blurs.get(), 1);
}

#[test]
fn test_once_off_and_named_subscriptions() {
    let (document, executor) = page();
    let (transport, _) = Scripted::new([
        Reply::Json(r#"{"posts":"","more":true}"#),
        Reply::Json(r#"{"posts":"","more":true}"#),
    ]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let button = widget.button().unwrap();
    let once = Rc::new(Cell::new(0));
    let named = Rc::new(Cell::new(0));
    {
        let once = Rc::clone(&once);
        widget.once(EventName::LoadFinish, move |_| once.set(once.get() + 1));
    }
    let id = {
        let named = Rc::clone(&named);
        widget
            .on_named("load:start", move |_| named.set(named.get() + 1))
            .unwrap()
            .unwrap()
    };
    assert!(matches!(widget.on_named("load:begin", |_| {}), Err(LoadError::UnknownEvent(_))));

    click(&document, &executor, button);
    assert!(widget.off(id));
    click(&document, &executor, button);

    assert_eq!(once.get(), 1);
    assert_eq!(named.get(), 1);
}

#[test]
fn test_dropping_widget_unbinds_trigger() {
    let (document, executor) = page();
    let (transport, requested) = Scripted::new([Reply::Json(r#"{"posts":"","more":true}"#)]);
    let widget = LoadMore::new(Rc::clone(&document), transport, Rc::clone(&executor), UserOptions::new());
    let button = widget.button().unwrap();
    assert_eq!(document.borrow().listeners().count(button, EventType::Click), 1);

    drop(widget);

    assert_eq!(document.borrow().listeners().count(button, EventType::Click), 0);
    click(&document, &executor, button);
    assert!(requested.borrow().is_empty());
}
