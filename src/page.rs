use anyhow::Context as _;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;
use url::Url;

/// A parsed document plus the location it was loaded from.
pub struct Page {
    document: NodeRef,
    url: Url,
}

impl Page {
    pub fn parse(html: &str, url: Url) -> Self {
        Self {
            document: kuchiki::parse_html().one(html),
            url,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn by_id(&self, id: &str) -> Option<NodeRef> {
        if id.is_empty() {
            return None;
        }
        let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
        self.document
            .select_first(&format!("[id=\"{escaped}\"]"))
            .ok()
            .map(|n| n.as_node().clone())
    }

    /// The `<html>` element.
    pub fn root(&self) -> Option<NodeRef> {
        self.document
            .select_first("html")
            .ok()
            .map(|n| n.as_node().clone())
    }

    pub fn body(&self) -> Option<NodeRef> {
        self.document
            .select_first("body")
            .ok()
            .map(|n| n.as_node().clone())
    }

    pub fn select_all(&self, selector: &str) -> Vec<NodeRef> {
        match self.document.select(selector) {
            Ok(nodes) => nodes.map(|n| n.as_node().clone()).collect(),
            Err(()) => {
                tracing::debug!(selector, "invalid selector");
                Vec::new()
            }
        }
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.document
            .serialize(&mut out)
            .context("serialize page")?;
        String::from_utf8(out).context("page html not utf-8")
    }
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    element.attributes.borrow().get(name).map(|s| s.to_string())
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(element) = node.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert(name, value.to_string());
    }
}

/// Nearest inclusive ancestor of `node` matching `selector`, like `Element.closest`.
pub fn closest(node: &NodeRef, selector: &str) -> Option<NodeRef> {
    let selectors = kuchiki::Selectors::compile(selector).ok()?;
    node.inclusive_ancestors()
        .filter_map(|n| n.into_element_ref())
        .find(|el| selectors.matches(el))
        .map(|el| el.as_node().clone())
}

/// True if `node` is `container` or lies inside it.
pub fn is_within(node: &NodeRef, container: &NodeRef) -> bool {
    node.inclusive_ancestors().any(|n| n == *container)
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class")
        .map(|c| c.split_whitespace().any(|t| t == class))
        .unwrap_or(false)
}

pub fn add_class(node: &NodeRef, class: &str) {
    if has_class(node, class) {
        return;
    }
    let current = attr(node, "class").unwrap_or_default();
    let next = if current.trim().is_empty() {
        class.to_string()
    } else {
        format!("{} {}", current.trim(), class)
    };
    set_attr(node, "class", &next);
}

pub fn remove_class(node: &NodeRef, class: &str) {
    let Some(current) = attr(node, "class") else {
        return;
    };
    let next = current
        .split_whitespace()
        .filter(|t| *t != class)
        .collect::<Vec<_>>()
        .join(" ");
    set_attr(node, "class", &next);
}

pub fn clear_children(node: &NodeRef) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
}

pub fn set_text(node: &NodeRef, text: &str) {
    clear_children(node);
    if !text.is_empty() {
        node.append(NodeRef::new_text(text));
    }
}

/// Replace the children of `node` with the parsed `html` fragment.
pub fn set_inner_html(node: &NodeRef, html: &str) {
    clear_children(node);
    if html.is_empty() {
        return;
    }
    let fragment = kuchiki::parse_html().one(html);
    let Ok(body) = fragment.select_first("body") else {
        return;
    };
    let children: Vec<NodeRef> = body.as_node().children().collect();
    for child in children {
        node.append(child);
    }
}

pub fn inner_html(node: &NodeRef) -> anyhow::Result<String> {
    let mut out = Vec::new();
    for child in node.children() {
        child.serialize(&mut out).context("serialize child")?;
    }
    String::from_utf8(out).context("inner html not utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> Page {
        Page::parse(html, Url::parse("https://docs.example.com/").unwrap())
    }

    #[test]
    fn closest_walks_up_from_text_nodes() {
        let p = page(r#"<div id="menu"><a href="/x"><span id="inner">Go</span></a></div>"#);
        let inner = p.by_id("inner").unwrap();
        let text = inner.first_child().unwrap();
        let link = closest(&text, "a[href]").unwrap();
        assert_eq!(attr(&link, "href").as_deref(), Some("/x"));
        assert!(closest(&text, "[data-close]").is_none());
        assert!(is_within(&text, &p.by_id("menu").unwrap()));
    }

    #[test]
    fn id_lookup_escapes_quotes_and_backslashes() {
        let p = page(r#"<p id='a\b'>slash</p><p id='say"hi"'>quote</p><p id="plain">x</p>"#);
        assert_eq!(p.by_id("a\\b").unwrap().text_contents(), "slash");
        assert_eq!(p.by_id("say\"hi\"").unwrap().text_contents(), "quote");
        assert!(p.by_id("plain").is_some());
        assert!(p.by_id("").is_none());
        assert!(p.by_id("missing").is_none());
    }

    #[test]
    fn class_tokens() {
        let p = page(r#"<body class="home"></body>"#);
        let body = p.body().unwrap();
        add_class(&body, "modal-open");
        add_class(&body, "modal-open");
        assert_eq!(attr(&body, "class").as_deref(), Some("home modal-open"));
        remove_class(&body, "modal-open");
        assert_eq!(attr(&body, "class").as_deref(), Some("home"));
        assert!(!has_class(&body, "modal-open"));
    }

    #[test]
    fn inner_html_replacement() {
        let p = page(r#"<div id="out"><b>old</b></div>"#);
        let out = p.by_id("out").unwrap();
        set_inner_html(&out, r#"<a class="result-item" href="/a">A</a><p>b</p>"#);
        assert_eq!(
            inner_html(&out).unwrap(),
            r#"<a class="result-item" href="/a">A</a><p>b</p>"#
        );
        set_text(&out, "1 < 2");
        assert_eq!(out.text_contents(), "1 < 2");
        set_text(&out, "");
        assert!(out.first_child().is_none());
    }
}
