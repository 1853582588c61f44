use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

/// Markup contract and localization. Every field defaults to the stock site layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Explicit deployment prefix (e.g. `/handbook/`). Detected from the page URL when unset.
    pub site_base: Option<String>,
    /// Top-level directories that hold pages of a root deployment rather than a subpath.
    pub content_dirs: Vec<String>,
    /// Index resource path, relative to the site base.
    pub index_path: String,
    /// Links scraped into the fallback index.
    pub nav_link_selector: String,
    pub theme_key: String,
    pub ids: ElementIds,
    pub labels: Labels,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_base: None,
            content_dirs: vec!["sections".to_string()],
            index_path: "assets/search-index.json".to_string(),
            nav_link_selector: ".side-list a, .menu-list a".to_string(),
            theme_key: "theme".to_string(),
            ids: ElementIds::default(),
            labels: Labels::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub theme_toggle: String,
    pub year: String,
    pub back_to_top: String,
    pub search_panel: String,
    pub search_open: Vec<String>,
    pub search_input: String,
    pub search_run: String,
    pub search_results: String,
    pub search_count: String,
    pub menu_panel: String,
    pub menu_open: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            theme_toggle: "themeToggleBtn".to_string(),
            year: "year".to_string(),
            back_to_top: "backToTop".to_string(),
            search_panel: "searchPanel".to_string(),
            search_open: vec!["searchOpenBtn".to_string(), "heroSearchBtn".to_string()],
            search_input: "searchInput".to_string(),
            search_run: "searchRunBtn".to_string(),
            search_results: "searchResults".to_string(),
            search_count: "searchCount".to_string(),
            menu_panel: "menuPanel".to_string(),
            menu_open: "menuOpenBtn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub nothing_found: String,
    /// Singular, few, many.
    pub result_forms: [String; 3],
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            nothing_found: "Ничего не найдено".to_string(),
            result_forms: [
                "результат".to_string(),
                "результата".to_string(),
                "результатов".to_string(),
            ],
        }
    }
}

impl SiteConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: SiteConfig = toml::from_str(
            r#"
site_base = "/handbook/"

[ids]
menu_panel = "nav"

[labels]
nothing_found = "Nothing found"
result_forms = ["result", "results", "results"]
"#,
        )
        .unwrap();

        assert_eq!(cfg.site_base.as_deref(), Some("/handbook/"));
        assert_eq!(cfg.ids.menu_panel, "nav");
        assert_eq!(cfg.ids.search_panel, "searchPanel");
        assert_eq!(cfg.labels.result_forms[1], "results");
        assert_eq!(cfg.index_path, "assets/search-index.json");
        assert_eq!(cfg.content_dirs, vec!["sections".to_string()]);
    }
}
