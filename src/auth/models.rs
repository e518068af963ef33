//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session kind carried in JWT claims.
///
/// A `Reservation` session comes from a passwordless email link and is
/// time-boxed to 48 hours. A `Full` session is backed by an identity
/// provider and is exempt from that rule.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Full,
    Reservation,
}

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub kind: SessionKind,
    pub iat: usize,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub email_verified: i64,
    pub created_at: Option<String>,
}

/// Google ID token payload for OAuth
#[derive(Deserialize)]
pub struct GoogleIdTokenPayload {
    pub id_token: String,
}

/// Pending reservation carried through the email-link round trip.
///
/// Stored alongside the sign-in token and echoed back on completion so the
/// client can prompt "reserve again to finish the hold". Never auto-applied.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PendingReservation {
    pub share_token: String,
    pub wish_id: String,
}

/// POST /api/auth/signin-link request body
#[derive(Deserialize)]
pub struct SendSignInLink {
    pub email: String,
    pub redirect_url: String,
    pub pending: Option<PendingReservation>,
}

/// POST /api/auth/signin-link/complete request body
#[derive(Deserialize)]
pub struct CompleteSignIn {
    pub token: String,
    pub email: String,
}

/// Sign-in token row
#[derive(FromRow, Debug)]
pub struct SignInToken {
    pub token: String,
    pub email: String,
    pub redirect_url: String,
    pub pending_share_token: Option<String>,
    pub pending_wish_id: Option<String>,
    pub created_at: Option<String>,
    pub expires_at: String,
    pub consumed_at: Option<String>,
}
