use std::rc::Rc;

use chrono::Datelike as _;
use kuchiki::NodeRef;

use crate::config::SiteConfig;
use crate::fetcher::Fetcher;
use crate::index::{IndexLoader, IndexSource, SearchIndex};
use crate::menu::{MenuClick, MenuController};
use crate::modal::ModalCoordinator;
use crate::page::{self, Page};
use crate::search::{self, SearchOutcome};
use crate::site::SiteBase;
use crate::store::PreferenceStore;
use crate::theme::{ColorScheme, Theme, ThemeController};

pub const SEARCH_CLOSE_SELECTOR: &str = "[data-close=\"panel\"]";

/// Host-side work a click asks for that the document itself cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FocusSearchInput,
    ScrollToTop,
}

#[derive(Debug, Default)]
pub struct ClickOutcome {
    pub default_prevented: bool,
    pub effects: Vec<Effect>,
    pub search: Option<SearchOutcome>,
    /// Link the menu let through; the host performs the navigation.
    pub navigate: Option<String>,
}

/// Application context: the page plus every controller wired to it.
pub struct App {
    page: Page,
    config: SiteConfig,
    base: SiteBase,
    theme: ThemeController,
    modals: ModalCoordinator,
    menu: MenuController,
    search_panel: Option<NodeRef>,
    index: IndexLoader,
    fetcher: Fetcher,
}

impl App {
    pub fn new(
        page: Page,
        config: SiteConfig,
        store: Rc<dyn PreferenceStore>,
        scheme: Rc<dyn ColorScheme>,
        fetcher: Fetcher,
    ) -> anyhow::Result<Self> {
        let base = SiteBase::detect(page.url(), &config);
        let index_url = base.index_url(page.url(), &config.index_path)?;
        tracing::debug!(base = base.as_str(), %index_url, "site base detected");

        let index = IndexLoader::new(
            IndexSource::Remote(index_url),
            fetcher.clone(),
            &config.nav_link_selector,
        );
        let theme = ThemeController::new(&config.theme_key, store, scheme);
        let menu = MenuController::new(&page, &config.ids.menu_panel);
        let search_panel = page.by_id(&config.ids.search_panel);

        let modals = ModalCoordinator::new();
        for panel in [search_panel.as_ref(), menu.panel()].into_iter().flatten() {
            modals.register(panel);
        }

        Ok(Self {
            page,
            config,
            base,
            theme,
            modals,
            menu,
            search_panel,
            index,
            fetcher,
        })
    }

    /// Replace where the index is read from. Only meaningful before the first load.
    pub fn with_index_source(mut self, source: IndexSource) -> Self {
        self.index = IndexLoader::new(
            source,
            self.fetcher.clone(),
            &self.config.nav_link_selector,
        );
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn base(&self) -> &SiteBase {
        &self.base
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    /// Page-load work that does not wait on the network.
    pub fn boot(&self) -> Theme {
        let theme = self.theme.init(&self.page);
        self.stamp_year(chrono::Local::now().year());
        theme
    }

    /// Start (or join) the one-shot index load.
    pub async fn preload(&self) -> Rc<SearchIndex> {
        self.index.loaded(&self.page).await
    }

    pub fn stamp_year(&self, year: i32) {
        if let Some(el) = self.page.by_id(&self.config.ids.year) {
            page::set_text(&el, &year.to_string());
        }
    }

    pub fn toggle_theme(&self) -> Theme {
        self.theme.toggle(&self.page)
    }

    pub fn color_scheme_changed(&self) -> Option<Theme> {
        self.theme.system_changed(&self.page)
    }

    pub fn open_search(&self) {
        self.modals.open(&self.page, self.search_panel.as_ref());
    }

    pub fn close_search(&self) {
        self.modals.close(&self.page, self.search_panel.as_ref());
    }

    pub fn open_menu(&self) {
        self.menu.open(&self.page, &self.modals);
    }

    pub fn close_menu(&self) {
        self.menu.close(&self.page, &self.modals);
    }

    pub fn query(&self) -> String {
        self.page
            .by_id(&self.config.ids.search_input)
            .and_then(|input| page::attr(&input, "value"))
            .unwrap_or_default()
    }

    pub fn count_text(&self) -> String {
        self.page
            .by_id(&self.config.ids.search_count)
            .map(|n| n.text_contents())
            .unwrap_or_default()
    }

    /// Live search: store the field's value and search it.
    pub async fn input(&self, text: &str) -> SearchOutcome {
        if let Some(input) = self.page.by_id(&self.config.ids.search_input) {
            page::set_attr(&input, "value", text);
        }
        self.search(text).await
    }

    pub async fn run_search(&self) -> SearchOutcome {
        let query = self.query();
        self.search(&query).await
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let q = search::normalize(query);
        let outcome = if q.is_empty() {
            SearchOutcome::Cleared
        } else {
            let index = self.preload().await;
            SearchOutcome::Hits(search::filter(&index, &q, &self.base))
        };
        self.render(&outcome);
        tracing::debug!(query = %q, hits = outcome.hits().len(), "search");
        outcome
    }

    fn render(&self, outcome: &SearchOutcome) {
        let rendered = search::render(outcome, &self.config.labels);
        if let Some(results) = self.page.by_id(&self.config.ids.search_results) {
            page::set_inner_html(&results, &rendered.results_html);
        }
        if let Some(count) = self.page.by_id(&self.config.ids.search_count) {
            page::set_text(&count, &rendered.count_text);
        }
    }

    pub async fn key_down(&self, key: &str, target: Option<&NodeRef>) -> Option<SearchOutcome> {
        match key {
            "Escape" => {
                self.close_search();
                self.close_menu();
                None
            }
            "Enter" if target.is_some_and(|t| self.hits_id(t, &self.config.ids.search_input)) => {
                Some(self.run_search().await)
            }
            _ => None,
        }
    }

    /// Dispatch a click on `target` to every control it lies inside, innermost semantics first.
    pub async fn click(&self, target: &NodeRef) -> ClickOutcome {
        let ids = &self.config.ids;
        let mut outcome = ClickOutcome::default();

        if self.hits_id(target, &ids.theme_toggle) {
            self.toggle_theme();
        }

        if self.hits_id(target, &ids.back_to_top) {
            outcome.default_prevented = true;
            outcome.effects.push(Effect::ScrollToTop);
        }

        if ids.search_open.iter().any(|id| self.hits_id(target, id)) {
            self.open_search();
            outcome.effects.push(Effect::FocusSearchInput);
        }

        if self.hits_id(target, &ids.search_run) {
            outcome.search = Some(self.run_search().await);
        }

        if let Some(panel) = &self.search_panel {
            let backdrop = target == panel;
            let close_marker = page::closest(target, SEARCH_CLOSE_SELECTOR)
                .is_some_and(|c| page::is_within(&c, panel));
            if backdrop || close_marker {
                self.close_search();
                if let Some(link) = page::closest(target, "a[href]") {
                    outcome.navigate = page::attr(&link, "href");
                }
            }
        }

        if self.hits_id(target, &ids.menu_open) {
            self.open_menu();
        }

        match self.menu.click(&self.page, &self.modals, target) {
            MenuClick::Navigate { href } => outcome.navigate = Some(href),
            MenuClick::Dismiss => outcome.default_prevented = true,
            MenuClick::Ignored => {}
        }

        outcome
    }

    fn hits_id(&self, target: &NodeRef, id: &str) -> bool {
        self.page
            .by_id(id)
            .map(|el| page::is_within(target, &el))
            .unwrap_or(false)
    }
}
