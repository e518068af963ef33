//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/google` - Google OAuth authentication (full session)
/// - `POST /api/auth/signin-link` - Send passwordless sign-in link
/// - `POST /api/auth/signin-link/complete` - Consume link, start reservation session
/// - `POST /api/auth/logout` - Logout (client-side token removal)
/// - `GET /api/me` - Get current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/google", post(handlers::google_auth))
        .route("/api/auth/signin-link", post(handlers::send_sign_in_link))
        .route(
            "/api/auth/signin-link/complete",
            post(handlers::complete_sign_in),
        )
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route("/api/me", get(handlers::me_handler))
}
