//! loadmore CLI
//!
//! Loads a page, binds a load-more widget to it, clicks the trigger until the
//! server runs out of posts (or `--max-pages` is reached) and prints the
//! container's final markup.

mod page;

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use loadmore::{CycleState, EventName, LoadMore, LoadMoreEvent, QueryFilters, UserOptions};
use loadmore_dom::{dispatch_event, DomEvent};
use loadmore_net::ResourceLoader;
use smol::LocalExecutor;

use crate::page::PageSource;

#[derive(Parser, Debug)]
#[command(name = "loadmore", version, about = "Run a load-more widget against a page")]
struct Cli {
    /// Page URL, or path to a local HTML file
    source: String,

    /// URL a local file is treated as served from
    #[arg(long, default_value = "http://localhost/")]
    base_url: String,

    /// JSON file with widget options (`buttonSelector`, `containerSelector`)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Trigger selector; overrides the options file
    #[arg(long)]
    button_selector: Option<String>,

    /// Container selector; overrides the options file
    #[arg(long)]
    container_selector: Option<String>,

    /// Extra query parameter sent with every request, as `key=value`
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

impl Cli {
    fn user_options(&self) -> Result<UserOptions> {
        let mut user = match &self.options {
            Some(path) => {
                let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
                UserOptions::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
            }
            None => UserOptions::new(),
        };
        if let Some(selector) = &self.button_selector {
            user = user.button_selector(selector);
        }
        if let Some(selector) = &self.container_selector {
            user = user.container_selector(selector);
        }
        Ok(user)
    }

    fn query_filters(&self) -> QueryFilters {
        self.filters
            .iter()
            .fold(QueryFilters::new(), |filters, (key, value)| filters.with(key, value))
    }
}

fn parse_filter(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{arg}`")),
    }
}

fn run(cli: Cli) -> Result<()> {
    let loader = ResourceLoader::with_timeout(Duration::from_secs(cli.timeout))?;
    let source = PageSource::from_arg(&cli.source, &cli.base_url);
    let document = source.load(&loader)?;

    let executor = Rc::new(LocalExecutor::new());
    let widget = LoadMore::with_filters(
        Rc::clone(&document),
        loader,
        cli.query_filters(),
        Rc::clone(&executor),
        cli.user_options()?,
    );
    if widget.is_inert() {
        bail!("no element matches `{}`", widget.options().button_selector);
    }
    let (Some(button), Some(container)) = (widget.button(), widget.container()) else {
        bail!("no element matches `{}`", widget.options().container_selector);
    };

    widget.on(EventName::PostAppend, |event| {
        if let LoadMoreEvent::PostAppend { post } = event {
            tracing::debug!("appended {}", post);
        }
    });
    widget.on(EventName::LoadError, |event| {
        if let LoadMoreEvent::LoadError { error } = event {
            tracing::error!("load failed: {}", error);
        }
    });

    let mut pages = 0;
    while widget.state() == Some(CycleState::Idle) && cli.max_pages.is_none_or(|max| pages < max) {
        let (done, finished) = smol::channel::bounded(1);
        widget.once(EventName::LoadFinish, move |_| {
            let _ = done.try_send(());
        });

        dispatch_event(&document, DomEvent::click(button));
        smol::block_on(executor.run(finished.recv())).context("load cycle abandoned")?;
        pages += 1;
    }

    let doc = document.borrow();
    tracing::info!(
        "{} page(s) loaded, {} element(s) in container",
        pages,
        doc.tree().element_children(container).len()
    );
    println!("{}", doc.tree().inner_html(container));
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
