//! # Wishes Module
//!
//! Wish CRUD and the reservation state machine:
//! available -> reserved -> purchased, with cancellation back to available.
//! The pure transitions live in [`reservation`]; handlers persist what the
//! state machine decides.

pub mod handlers;
pub mod models;
pub mod reservation;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::wishes_routes;
