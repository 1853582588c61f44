use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context as _;
use serde_json::Value;
use tokio::sync::OnceCell;
use url::Url;

use crate::fetcher::Fetcher;
use crate::page::{self, Page};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexEntry {
    pub title: String,
    pub url: String,
    pub description: String,
    pub keywords: String,
}

impl IndexEntry {
    fn from_value(value: &Value) -> Self {
        let field = |name: &str| match value.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        };
        Self {
            title: field("title"),
            url: field("url"),
            description: field("description"),
            keywords: field("keywords"),
        }
    }

    /// Lowercased `title description keywords`, the text a query is matched against.
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.keywords).to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndex {
    pub entries: Vec<IndexEntry>,
}

impl SearchIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Anything but a JSON array leaves the index empty.
    pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
        let data: Value = serde_json::from_slice(bytes).context("parse search index")?;
        let Value::Array(items) = data else {
            tracing::debug!("search index is not an array; leaving it empty");
            return Ok(Self::default());
        };
        Ok(Self {
            entries: items.iter().map(IndexEntry::from_value).collect(),
        })
    }

    /// Title-only entries built from the page's navigation links, in document order.
    pub fn from_nav_links(page: &Page, selector: &str) -> Self {
        let entries = page
            .select_all(selector)
            .iter()
            .map(|a| IndexEntry {
                title: a.text_contents().trim().to_string(),
                url: page::attr(a, "href").unwrap_or_default(),
                description: String::new(),
                keywords: String::new(),
            })
            .collect();
        Self { entries }
    }
}

#[derive(Debug, Clone)]
pub enum IndexSource {
    Remote(Url),
    Local(PathBuf),
}

pub struct IndexLoader {
    source: IndexSource,
    fetcher: Fetcher,
    nav_link_selector: String,
    cell: OnceCell<Rc<SearchIndex>>,
}

impl IndexLoader {
    pub fn new(source: IndexSource, fetcher: Fetcher, nav_link_selector: &str) -> Self {
        Self {
            source,
            fetcher,
            nav_link_selector: nav_link_selector.to_string(),
            cell: OnceCell::new(),
        }
    }

    /// Every caller awaits the same one-shot load; later calls return the cached index.
    pub async fn loaded(&self, page: &Page) -> Rc<SearchIndex> {
        self.cell
            .get_or_init(|| async { Rc::new(self.load(page).await) })
            .await
            .clone()
    }

    async fn load(&self, page: &Page) -> SearchIndex {
        let bytes = match &self.source {
            IndexSource::Remote(url) => self
                .fetcher
                .get_bytes(url.clone())
                .await
                .map(|b| b.to_vec()),
            IndexSource::Local(path) => {
                std::fs::read(path).with_context(|| format!("read {}", path.display()))
            }
        };

        match bytes.and_then(|b| SearchIndex::from_json(&b)) {
            Ok(index) => {
                tracing::info!(count = index.len(), "search index loaded");
                index
            }
            Err(e) => {
                let index = SearchIndex::from_nav_links(page, &self.nav_link_selector);
                tracing::warn!(
                    error = %format!("{e:#}"),
                    count = index.len(),
                    "search index unavailable; using navigation links"
                );
                index
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_entries() {
        let index = SearchIndex::from_json(
            br#"[
                {"title": "Intro", "url": "/sections/intro.html", "description": "Start", "keywords": "basics"},
                {"title": "Numbers", "url": "n.html", "keywords": 42},
                "stray"
            ]"#,
        )
        .unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.entries[0].title, "Intro");
        assert_eq!(index.entries[1].description, "");
        assert_eq!(index.entries[1].keywords, "42");
        assert_eq!(index.entries[2], IndexEntry::default());
    }

    #[test]
    fn non_array_is_empty_not_error() {
        let index = SearchIndex::from_json(br#"{"title": "x"}"#).unwrap();
        assert!(index.is_empty());
        assert!(SearchIndex::from_json(b"{oops").is_err());
    }

    #[test]
    fn nav_links_fallback_in_document_order() {
        let page = Page::parse(
            r#"<nav><ul class="side-list"><li><a href="/sections/intro.html"> Intro </a></li></ul>
               <ul class="menu-list"><li><a>No href</a></li></ul>
               <ul class="other"><li><a href="/skip.html">Skip</a></li></ul></nav>"#,
            Url::parse("https://docs.example.com/").unwrap(),
        );
        let index = SearchIndex::from_nav_links(&page, ".side-list a, .menu-list a");
        assert_eq!(index.len(), 2);
        assert_eq!(index.entries[0].title, "Intro");
        assert_eq!(index.entries[0].url, "/sections/intro.html");
        assert_eq!(index.entries[1].url, "");
    }

    #[test]
    fn haystack_joins_fields_lowercased() {
        let entry = IndexEntry {
            title: "Ownership".to_string(),
            url: "/o.html".to_string(),
            description: "Borrow Rules".to_string(),
            keywords: "RC".to_string(),
        };
        assert_eq!(entry.haystack(), "ownership borrow rules rc");
    }
}
