// src/scraper/routes.rs

use axum::{routing::post, Router};

use super::handlers;

/// Create the scraper router
pub fn scraper_routes() -> Router {
    Router::new().route("/api/scrape", post(handlers::scrape_url))
}
