use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::SiteConfig;

static EXTERNAL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("external url regex"));

/// Path prefix the site is deployed under, always `/`-delimited (`/` for a root deployment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteBase(String);

impl SiteBase {
    pub fn root() -> Self {
        SiteBase("/".to_string())
    }

    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            Self::root()
        } else {
            SiteBase(format!("/{trimmed}/"))
        }
    }

    /// First directory of the page path, unless it is a content directory of a root deployment.
    pub fn detect(page_url: &Url, config: &SiteConfig) -> Self {
        if let Some(explicit) = &config.site_base {
            return Self::new(explicit);
        }

        let mut segments: Vec<&str> = page_url
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();
        // The last segment names the document (empty for a trailing slash).
        segments.pop();

        match segments.first() {
            Some(first) if !first.is_empty() && !config.content_dirs.iter().any(|d| d == first) => {
                Self::new(first)
            }
            _ => Self::root(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn index_url(&self, page_url: &Url, index_path: &str) -> anyhow::Result<Url> {
        let path = format!("{}{}", self.0, index_path.trim_start_matches('/'));
        Ok(page_url.join(&path)?)
    }

    /// Rewrite an index URL so it works from any page depth under this base.
    pub fn resolve(&self, raw: &str) -> String {
        let url = raw.trim();
        if url.is_empty() {
            return "#".to_string();
        }
        // Protocol-relative URLs point off-site, like http(s).
        if EXTERNAL_URL.is_match(url) || url.starts_with("//") || url.starts_with('#') {
            return url.to_string();
        }
        if url.starts_with(&self.0) || url == self.0.trim_end_matches('/') {
            return url.to_string();
        }
        if let Some(rest) = url.strip_prefix('/') {
            return format!("{}{}", self.0, rest);
        }

        let mut rest = url;
        loop {
            if let Some(r) = rest.strip_prefix("./") {
                rest = r;
            } else if let Some(r) = rest.strip_prefix("../") {
                rest = r;
            } else {
                break;
            }
        }
        format!("{}{}", self.0, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(url: &str) -> SiteBase {
        SiteBase::detect(&Url::parse(url).unwrap(), &SiteConfig::default())
    }

    #[test]
    fn detects_subpath_deployments() {
        assert_eq!(detect("https://x.github.io/handbook/index.html").as_str(), "/handbook/");
        assert_eq!(
            detect("https://x.github.io/handbook/sections/intro.html").as_str(),
            "/handbook/"
        );
        assert_eq!(detect("https://x.github.io/handbook/").as_str(), "/handbook/");
        assert_eq!(detect("https://x.github.io/index.html").as_str(), "/");
        assert_eq!(detect("https://x.github.io/").as_str(), "/");
        assert_eq!(detect("https://x.github.io/sections/intro.html").as_str(), "/");
    }

    #[test]
    fn explicit_base_wins() {
        let cfg = SiteConfig {
            site_base: Some("docs".to_string()),
            ..SiteConfig::default()
        };
        let base = SiteBase::detect(&Url::parse("https://x.io/a/b/c.html").unwrap(), &cfg);
        assert_eq!(base.as_str(), "/docs/");
    }

    #[test]
    fn resolves_against_subpath_base() {
        let base = SiteBase::new("/handbook/");
        assert_eq!(base.resolve("https://rust-lang.org/x"), "https://rust-lang.org/x");
        assert_eq!(base.resolve("HTTP://example.com"), "HTTP://example.com");
        assert_eq!(base.resolve("#top"), "#top");
        assert_eq!(base.resolve("/handbook/a.html"), "/handbook/a.html");
        assert_eq!(base.resolve("/handbook"), "/handbook");
        assert_eq!(base.resolve("//cdn.example.com/x"), "//cdn.example.com/x");
        assert_eq!(base.resolve("/sections/a.html"), "/handbook/sections/a.html");
        assert_eq!(base.resolve("sections/a.html"), "/handbook/sections/a.html");
        assert_eq!(base.resolve("./sections/a.html"), "/handbook/sections/a.html");
        assert_eq!(base.resolve("../../sections/a.html"), "/handbook/sections/a.html");
        assert_eq!(base.resolve(""), "#");
    }

    #[test]
    fn resolves_against_root_base() {
        let base = SiteBase::root();
        assert_eq!(base.resolve("/sections/intro.html"), "/sections/intro.html");
        assert_eq!(base.resolve("../sections/intro.html"), "/sections/intro.html");
    }

    #[test]
    fn index_url_is_under_base() {
        let page = Url::parse("https://x.io/handbook/sections/a.html").unwrap();
        let url = SiteBase::new("/handbook/")
            .index_url(&page, "assets/search-index.json")
            .unwrap();
        assert_eq!(url.as_str(), "https://x.io/handbook/assets/search-index.json");
    }
}
