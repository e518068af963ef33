// src/wishlists/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the wishlists router
pub fn wishlists_routes() -> Router {
    Router::new()
        // Public share-token view (no auth)
        .route(
            "/api/public/wishlists/:share_token",
            get(handlers::get_public_wishlist),
        )
        // Owner surface
        .route(
            "/api/wishlists",
            get(handlers::list_my_wishlists).post(handlers::create_wishlist),
        )
        .route(
            "/api/wishlists/:id",
            get(handlers::get_wishlist)
                .patch(handlers::update_wishlist)
                .delete(handlers::delete_wishlist),
        )
        .route("/api/wishlists/:id/share", post(handlers::share_wishlist))
}
