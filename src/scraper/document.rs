// src/scraper/document.rs
//! Lightweight DOM stand-in for the extraction cascade.
//!
//! Parses raw HTML into just the shapes the cascade queries: meta tags,
//! the document title, and elements carrying class/id/itemprop attributes
//! with their text content, in document order. Regex-tokenized on purpose -
//! a full HTML parser buys nothing for a best-effort heuristic that
//! tolerates misses by design.

use regex::Regex;
use std::sync::OnceLock;

fn meta_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("meta regex is valid"))
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
            .expect("attr regex is valid")
    })
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex is valid"))
}

fn element_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<([a-zA-Z][a-zA-Z0-9]*)\b([^>]*)>").expect("element regex is valid")
    })
}

fn tag_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<[^>]*>").expect("tag strip regex is valid"))
}

/// A `<meta>` tag's relevant attributes
#[derive(Debug, Clone)]
pub struct MetaTag {
    pub property: Option<String>,
    pub name: Option<String>,
    pub itemprop: Option<String>,
    pub content: Option<String>,
}

/// An element carrying class/id/itemprop attributes, with its text content
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub class_attr: String,
    pub id: String,
    pub itemprop: Option<String>,
    pub text: String,
}

impl Element {
    /// Whether the element's class attribute contains `token` as a whole
    /// class name (the `.token` selector)
    pub fn has_class(&self, token: &str) -> bool {
        self.class_attr
            .split_whitespace()
            .any(|c| c.eq_ignore_ascii_case(token))
    }
}

/// Parsed document handle the cascade runs against
#[derive(Debug, Default)]
pub struct Document {
    pub title: Option<String>,
    pub metas: Vec<MetaTag>,
    pub elements: Vec<Element>,
}

fn attrs_of(raw: &str) -> Vec<(String, String)> {
    attr_re()
        .captures_iter(raw)
        .map(|cap| {
            let key = cap[1].to_ascii_lowercase();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            (key, value)
        })
        .collect()
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let mut doc = Document::default();

        // Title text is kept verbatim - downstream consumers decide what
        // whitespace means.
        doc.title = title_re()
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string());

        for meta_match in meta_re().find_iter(html) {
            let attrs = attrs_of(meta_match.as_str());
            let get = |key: &str| {
                attrs
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
            };
            doc.metas.push(MetaTag {
                property: get("property"),
                name: get("name"),
                itemprop: get("itemprop"),
                content: get("content"),
            });
        }

        for el_cap in element_re().captures_iter(html) {
            let tag = el_cap[1].to_ascii_lowercase();
            if tag == "meta" {
                continue;
            }
            let attrs = attrs_of(&el_cap[2]);
            let get = |key: &str| {
                attrs
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
            };

            let class_attr = get("class").unwrap_or_default();
            let id = get("id").unwrap_or_default();
            let itemprop = get("itemprop");
            if class_attr.is_empty() && id.is_empty() && itemprop.is_none() {
                continue;
            }

            let open_end = el_cap.get(0).map(|m| m.end()).unwrap_or(0);
            let text = text_content(&html[open_end..], &tag);

            doc.elements.push(Element {
                tag,
                class_attr,
                id,
                itemprop,
                text,
            });
        }

        doc
    }

    /// First meta tag whose `property` or `name` equals `key` and carries
    /// non-empty content
    pub fn meta_content(&self, key: &str) -> Option<&str> {
        self.metas
            .iter()
            .filter(|m| {
                m.property.as_deref() == Some(key) || m.name.as_deref() == Some(key)
            })
            .find_map(|m| m.content.as_deref().filter(|c| !c.is_empty()))
    }

    /// First meta tag whose `itemprop` equals `key` and carries non-empty
    /// content
    pub fn meta_itemprop_content(&self, key: &str) -> Option<&str> {
        self.metas
            .iter()
            .filter(|m| m.itemprop.as_deref() == Some(key))
            .find_map(|m| m.content.as_deref().filter(|c| !c.is_empty()))
    }
}

/// Inner text of an element: everything up to the first matching close tag,
/// with nested markup stripped.
fn text_content(rest: &str, tag: &str) -> String {
    let close = format!("</{}", tag);
    let lower = rest.to_ascii_lowercase();
    let inner = match lower.find(&close) {
        Some(idx) => &rest[..idx],
        None => rest,
    };
    tag_strip_re().replace_all(inner, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_meta_properties_and_title() {
        let html = r#"<html><head>
            <title>Nike Air Max 90 – Nike.com</title>
            <meta property="og:title" content="Nike Air Max 90" />
            <meta name="description" content="A shoe." />
        </head><body></body></html>"#;

        let doc = Document::parse(html);
        assert_eq!(doc.title.as_deref(), Some("Nike Air Max 90 – Nike.com"));
        assert_eq!(doc.meta_content("og:title"), Some("Nike Air Max 90"));
        assert_eq!(doc.meta_content("description"), Some("A shoe."));
        assert_eq!(doc.meta_content("og:image"), None);
    }

    #[test]
    fn test_single_quoted_and_unquoted_attributes() {
        let html = r#"<meta property='og:image' content='https://cdn.example.com/x.jpg'>"#;
        let doc = Document::parse(html);
        assert_eq!(
            doc.meta_content("og:image"),
            Some("https://cdn.example.com/x.jpg")
        );
    }

    #[test]
    fn test_element_text_strips_nested_markup() {
        let html = r#"<div class="price">Now <strong>$25.00</strong>!</div>"#;
        let doc = Document::parse(html);
        let el = doc.elements.iter().find(|e| e.has_class("price")).unwrap();
        assert_eq!(el.text, "Now $25.00!");
    }

    #[test]
    fn test_elements_without_hooks_are_skipped() {
        let doc = Document::parse("<div><p>plain</p></div>");
        assert!(doc.elements.is_empty());
    }

    #[test]
    fn test_empty_meta_content_is_not_a_match() {
        let html = r#"<meta property="og:price:amount" content="">"#;
        let doc = Document::parse(html);
        assert_eq!(doc.meta_content("og:price:amount"), None);
    }
}
