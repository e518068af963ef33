//! # Auth Module
//!
//! Identity and session handling:
//! - Google ID-token sign-in (full sessions)
//! - Passwordless email-link sign-in (48-hour reservation sessions)
//! - JWT issuance and validation
//! - AuthedUser / MaybeAuthedUser extractors for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use extractors::{AuthedUser, MaybeAuthedUser};
pub use models::SessionKind;
pub use routes::auth_routes;
