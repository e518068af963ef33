//! # Scraper Module
//!
//! Best-effort product metadata extraction: Open Graph tags, then microdata
//! meta tags, then class/id selector heuristics with narrow USD regex
//! patterns. The cascade itself ([`extract::scrape_product`]) is pure and
//! synchronous; only the HTTP handler fetches.

pub mod document;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use routes::scraper_routes;
