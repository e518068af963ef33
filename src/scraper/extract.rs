// src/scraper/extract.rs
//! The product-field extraction cascade.
//!
//! Pure and synchronous: one parsed document in, one plain record out, no
//! I/O. Structured metadata (Open Graph / microdata) outranks class-based
//! heuristics because it is author-asserted; the regex price patterns are a
//! deliberately narrow, USD-only last resort - a site that fails them
//! yields no price rather than a wrong one.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::document::{Document, Element};

/// Best-effort scrape result. Every field except `url` is optional, and
/// absence means "could not determine" - never zero or empty string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScrapedProduct {
    pub url: String,
    pub title: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Meta keys consulted for a price, in strict priority order
const PRICE_META_KEYS: [&str; 2] = ["product:price:amount", "og:price:amount"];

/// Selector heuristics scanned when no structured price exists, in order
#[derive(Debug, Clone, Copy)]
enum PriceSelector {
    /// `.price`
    Class(&'static str),
    /// `[class*="price"]`
    ClassContains(&'static str),
    /// `[id*="price"]`
    IdContains(&'static str),
    /// `span[itemprop="price"]`
    TagItemprop(&'static str, &'static str),
}

const PRICE_SELECTORS: [PriceSelector; 6] = [
    PriceSelector::Class("price"),
    PriceSelector::ClassContains("price"),
    PriceSelector::IdContains("price"),
    PriceSelector::TagItemprop("span", "price"),
    PriceSelector::Class("product-price"),
    PriceSelector::Class("sale-price"),
];

fn price_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\$[\d,]+\.?\d*").expect("dollar pattern is valid"),
            Regex::new(r"USD\s*[\d,]+\.?\d*").expect("usd prefix pattern is valid"),
            Regex::new(r"[\d,]+\.?\d*\s*USD").expect("usd suffix pattern is valid"),
        ]
    })
}

/// Run the full cascade against a parsed document.
///
/// Fields are independent: a missing image never affects the title.
pub fn scrape_product(doc: &Document, url: &str) -> ScrapedProduct {
    ScrapedProduct {
        url: url.to_string(),
        title: extract_title(doc),
        price: extract_price(doc),
        image: doc.meta_content("og:image").map(str::to_string),
        description: doc.meta_content("og:description").map(str::to_string),
    }
}

/// og:title wins; the document title is the fallback, verbatim
fn extract_title(doc: &Document) -> Option<String> {
    doc.meta_content("og:title")
        .map(str::to_string)
        .or_else(|| doc.title.clone())
}

/// Price cascade: structured meta tags first (content verbatim, no
/// parsing), then the selector scan with the regex patterns.
fn extract_price(doc: &Document) -> Option<String> {
    for key in PRICE_META_KEYS {
        if let Some(content) = doc.meta_content(key) {
            return Some(content.to_string());
        }
    }
    if let Some(content) = doc.meta_itemprop_content("price") {
        return Some(content.to_string());
    }

    for selector in PRICE_SELECTORS {
        if let Some(element) = first_match(doc, selector) {
            for pattern in price_patterns() {
                if let Some(found) = pattern.find(&element.text) {
                    return Some(found.as_str().to_string());
                }
            }
        }
    }

    None
}

fn first_match(doc: &Document, selector: PriceSelector) -> Option<&Element> {
    doc.elements.iter().find(|el| match selector {
        PriceSelector::Class(token) => el.has_class(token),
        PriceSelector::ClassContains(fragment) => el.class_attr.contains(fragment),
        PriceSelector::IdContains(fragment) => el.id.contains(fragment),
        PriceSelector::TagItemprop(tag, itemprop) => {
            el.tag == tag && el.itemprop.as_deref() == Some(itemprop)
        }
    })
}
