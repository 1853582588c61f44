mod app;
mod cli;
mod config;
mod fetcher;
mod index;
mod menu;
mod modal;
mod page;
mod search;
mod site;
mod store;
mod theme;

use std::io::Write as _;
use std::rc::Rc;

use anyhow::Context as _;

pub use app::{App, ClickOutcome, Effect};
pub use cli::Args as CliArgs;
pub use config::{ElementIds, Labels, SiteConfig};
pub use fetcher::Fetcher;
pub use index::{IndexEntry, IndexSource, SearchIndex};
pub use menu::MenuClick;
pub use modal::{MODAL_OPEN_CLASS, ModalCoordinator};
pub use page::Page;
pub use search::{PluralForm, SearchHit, SearchOutcome};
pub use site::SiteBase;
pub use store::{FileStore, MemoryStore, PreferenceStore, UnavailableStore};
pub use theme::{ColorScheme, ManualScheme, SystemScheme, THEME_ATTR, Theme};

/// Re-exported DOM helpers for hosts driving a [`Page`].
pub mod dom {
    pub use crate::modal::{body_flag_set, is_open};
    pub use crate::page::{attr, closest, has_class, inner_html, is_within, set_attr};
}

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };

    let html = std::fs::read_to_string(&args.page)
        .with_context(|| format!("read {}", args.page.display()))?;
    let page = Page::parse(&html, args.url.clone());

    let store: Rc<dyn PreferenceStore> = match &args.store {
        Some(path) => Rc::new(FileStore::new(path.clone())),
        None => Rc::new(MemoryStore::new()),
    };
    let fetcher = Fetcher::new(&args.user_agent)?;

    let mut app = App::new(page, config, store, Rc::new(args.color_scheme), fetcher)?;
    if let Some(path) = &args.index {
        app = app.with_index_source(IndexSource::Local(path.clone()));
    }

    let theme = app.boot();
    tracing::info!(theme = theme.as_str(), base = app.base().as_str(), "page booted");

    // The query races the index load; both settle on the same index.
    let (index, outcome) = tokio::join!(app.preload(), async {
        match &args.query {
            Some(q) => Some(app.input(q).await),
            None => None,
        }
    });
    tracing::info!(entries = index.len(), "search index ready");

    if args.toggle_theme {
        let theme = app.toggle_theme();
        tracing::info!(theme = theme.as_str(), "theme toggled");
    }

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "theme\t{}", app.theme().as_str()).context("write stdout")?;
    if let Some(outcome) = &outcome {
        let count = app.count_text();
        if !count.is_empty() {
            writeln!(stdout, "count\t{count}").context("write stdout")?;
        }
        for hit in outcome.hits() {
            writeln!(stdout, "{}\t{}", hit.title, hit.href).context("write stdout")?;
        }
    }

    if let Some(out) = &args.out {
        if let Some(parent) = out.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let html = app.page().to_html()?;
        std::fs::write(out, html).with_context(|| format!("write {}", out.display()))?;
    }

    Ok(())
}
