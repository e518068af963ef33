// src/scraper/handlers.rs

use axum::{extract::Extension, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::document::Document;
use super::extract::scrape_product;
use crate::common::{ApiError, AppState};

const FETCH_TIMEOUT_SECS: u64 = 10;
/// Pages larger than this are cut off before parsing; product metadata
/// lives in the head anyway.
const MAX_HTML_BYTES: usize = 2 * 1024 * 1024;

#[derive(Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Serialize, Debug)]
pub struct ScrapeResponse {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub image: Option<String>,
    pub source: Option<String>,
}

/// POST /api/scrape - Fetch a product page and run the extraction cascade.
///
/// Scraper misses are not errors: a reachable page with no recognizable
/// metadata answers 200 with null fields and the caller falls back to
/// manual entry.
pub async fn scrape_url(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let url = payload.url.trim().to_string();
    let parsed = reqwest::Url::parse(&url)
        .map_err(|_| ApiError::ValidationError("url: A valid URL is required".to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ApiError::ValidationError(
            "url: Only http(s) URLs can be scraped".to_string(),
        ));
    }

    debug!(url = %url, "Fetching page for scrape");

    let response = state
        .http
        .get(parsed.clone())
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, url = %url, "Scrape fetch failed");
            ApiError::ServiceUnavailable("could not fetch the page".to_string())
        })?;

    if !response.status().is_success() {
        warn!(http_status = %response.status(), url = %url, "Scrape target returned error status");
        return Err(ApiError::BadRequest(
            "the page could not be retrieved".to_string(),
        ));
    }

    let mut html = response.text().await.map_err(|e| {
        warn!(error = %e, url = %url, "Scrape body read failed");
        ApiError::ServiceUnavailable("could not read the page".to_string())
    })?;
    if html.len() > MAX_HTML_BYTES {
        let mut cut = MAX_HTML_BYTES;
        while !html.is_char_boundary(cut) {
            cut -= 1;
        }
        html.truncate(cut);
    }

    let doc = Document::parse(&html);
    let product = scrape_product(&doc, &url);
    let currency = infer_currency(&doc, product.price.as_deref());
    let source = parsed.host_str().map(str::to_string);

    info!(
        url = %url,
        found_title = product.title.is_some(),
        found_price = product.price.is_some(),
        "Scrape completed"
    );

    Ok(Json(ScrapeResponse {
        url: product.url,
        title: product.title,
        description: product.description,
        price: product.price,
        currency,
        image: product.image,
        source,
    }))
}

/// Currency is metadata-first like everything else; the regex patterns are
/// dollar-denominated by construction, so a regex-derived price implies
/// USD.
fn infer_currency(doc: &Document, price: Option<&str>) -> Option<String> {
    if let Some(meta) = doc
        .meta_content("product:price:currency")
        .or_else(|| doc.meta_content("og:price:currency"))
    {
        return Some(meta.to_string());
    }
    match price {
        Some(p) if p.contains('$') || p.contains("USD") => Some("USD".to_string()),
        Some(_) => Some("USD".to_string()), // bare meta amount, product default
        None => None,
    }
}
