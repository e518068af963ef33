//! # Wishlists Module
//!
//! Wishlist ownership, share tokens, and the public visitor view.
//! Denormalized wish/reserved counters live on the wishlist row and are
//! maintained by the wish handlers.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::wishlists_routes;
