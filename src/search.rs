use maud::{Markup, html};

use crate::config::Labels;
use crate::index::SearchIndex;
use crate::site::SiteBase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralForm {
    One,
    Few,
    Many,
}

impl PluralForm {
    /// Three-way numeral agreement on the last one and two digits.
    pub fn for_count(n: usize) -> Self {
        let d10 = n % 10;
        let d100 = n % 100;
        if d10 == 1 && d100 != 11 {
            PluralForm::One
        } else if (2..=4).contains(&d10) && !(12..=14).contains(&d100) {
            PluralForm::Few
        } else {
            PluralForm::Many
        }
    }

    pub fn pick(self, forms: &[String; 3]) -> &str {
        match self {
            PluralForm::One => &forms[0],
            PluralForm::Few => &forms[1],
            PluralForm::Many => &forms[2],
        }
    }
}

pub fn count_label(n: usize, labels: &Labels) -> String {
    format!("{} {}", n, PluralForm::for_count(n).pick(&labels.result_forms))
}

pub fn normalize(query: &str) -> String {
    query.to_lowercase().trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query: results and count are cleared.
    Cleared,
    Hits(Vec<SearchHit>),
}

impl SearchOutcome {
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            SearchOutcome::Cleared => &[],
            SearchOutcome::Hits(hits) => hits,
        }
    }
}

/// Substring match over every entry, in index order. `query` must already be normalized.
pub fn filter(index: &SearchIndex, query: &str, base: &SiteBase) -> Vec<SearchHit> {
    index
        .entries
        .iter()
        .filter(|e| e.haystack().contains(query))
        .map(|e| SearchHit {
            title: e.title.clone(),
            href: base.resolve(&e.url),
            description: e.description.clone(),
        })
        .collect()
}

pub struct RenderedResults {
    pub results_html: String,
    pub count_text: String,
}

pub fn render(outcome: &SearchOutcome, labels: &Labels) -> RenderedResults {
    match outcome {
        SearchOutcome::Cleared => RenderedResults {
            results_html: String::new(),
            count_text: String::new(),
        },
        SearchOutcome::Hits(hits) if hits.is_empty() => RenderedResults {
            results_html: html! { div class="muted" { (labels.nothing_found) } }.into_string(),
            count_text: count_label(0, labels),
        },
        SearchOutcome::Hits(hits) => {
            let markup: Markup = html! {
                @for hit in hits {
                    a class="result-item" href=(hit.href) data-close="panel" {
                        div class="result-title" { (hit.title) }
                        @if !hit.description.is_empty() {
                            p class="result-desc" { (hit.description) }
                        }
                    }
                }
            };
            RenderedResults {
                results_html: markup.into_string(),
                count_text: count_label(hits.len(), labels),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexEntry;

    fn entry(title: &str, url: &str, description: &str, keywords: &str) -> IndexEntry {
        IndexEntry {
            title: title.to_string(),
            url: url.to_string(),
            description: description.to_string(),
            keywords: keywords.to_string(),
        }
    }

    fn index() -> SearchIndex {
        SearchIndex {
            entries: vec![
                entry("Ownership", "sections/own.html", "Move semantics", "borrow"),
                entry("Traits", "/sections/traits.html", "", "generics dyn"),
                entry("Rust site", "https://rust-lang.org", "External", ""),
            ],
        }
    }

    #[test]
    fn plural_forms() {
        let cases = [
            (0, PluralForm::Many),
            (1, PluralForm::One),
            (2, PluralForm::Few),
            (4, PluralForm::Few),
            (5, PluralForm::Many),
            (11, PluralForm::Many),
            (12, PluralForm::Many),
            (14, PluralForm::Many),
            (21, PluralForm::One),
            (22, PluralForm::Few),
            (101, PluralForm::One),
            (111, PluralForm::Many),
            (112, PluralForm::Many),
        ];
        for (n, form) in cases {
            assert_eq!(PluralForm::for_count(n), form, "n = {n}");
        }
    }

    #[test]
    fn count_labels_use_locale_forms() {
        let labels = Labels::default();
        assert_eq!(count_label(1, &labels), "1 результат");
        assert_eq!(count_label(3, &labels), "3 результата");
        assert_eq!(count_label(0, &labels), "0 результатов");
    }

    #[test]
    fn matches_across_title_description_keywords() {
        let base = SiteBase::new("/handbook/");
        let idx = index();

        let hits = filter(&idx, "borrow", &base);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].href, "/handbook/sections/own.html");

        let hits = filter(&idx, "s", &base);
        assert_eq!(
            hits.iter().map(|h| h.title.as_str()).collect::<Vec<_>>(),
            vec!["Ownership", "Traits", "Rust site"]
        );

        // Fields are joined with spaces, so a query may span them.
        assert_eq!(filter(&idx, "ownership move", &base).len(), 1);
        assert!(filter(&idx, "zzz", &base).is_empty());
        assert_eq!(
            filter(&idx, &normalize("  TRAITS "), &base)[0].href,
            "/handbook/sections/traits.html"
        );
        assert_eq!(
            filter(&idx, "external", &base)[0].href,
            "https://rust-lang.org"
        );
    }

    #[test]
    fn renders_escaped_results_and_optional_description() {
        let labels = Labels::default();
        let outcome = SearchOutcome::Hits(vec![
            SearchHit {
                title: "A <b>".to_string(),
                href: "/a.html".to_string(),
                description: String::new(),
            },
            SearchHit {
                title: "B".to_string(),
                href: "/b.html".to_string(),
                description: "About B".to_string(),
            },
        ]);
        let rendered = render(&outcome, &labels);
        assert_eq!(
            rendered.results_html,
            concat!(
                r#"<a class="result-item" href="/a.html" data-close="panel"><div class="result-title">A &lt;b&gt;</div></a>"#,
                r#"<a class="result-item" href="/b.html" data-close="panel"><div class="result-title">B</div><p class="result-desc">About B</p></a>"#,
            )
        );
        assert_eq!(rendered.count_text, "2 результата");
    }

    #[test]
    fn renders_nothing_found_and_cleared() {
        let labels = Labels::default();
        let empty = render(&SearchOutcome::Hits(Vec::new()), &labels);
        assert_eq!(empty.results_html, r#"<div class="muted">Ничего не найдено</div>"#);
        assert_eq!(empty.count_text, "0 результатов");

        let cleared = render(&SearchOutcome::Cleared, &labels);
        assert!(cleared.results_html.is_empty());
        assert!(cleared.count_text.is_empty());
    }
}
