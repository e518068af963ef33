// src/wishes/routes.rs

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers;

/// Create the wishes router
pub fn wishes_routes() -> Router {
    Router::new()
        // Owner wish management
        .route(
            "/api/wishlists/:id/wishes",
            get(handlers::list_wishes).post(handlers::create_wish),
        )
        .route(
            "/api/wishes/:id",
            patch(handlers::update_wish).delete(handlers::delete_wish),
        )
        // Reservation transitions
        .route("/api/wishes/:id/reserve", post(handlers::reserve_wish))
        .route(
            "/api/wishes/:id/cancel-reservation",
            post(handlers::cancel_reservation),
        )
}
