//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::{Claims, SessionKind, User};
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Validates the bearer JWT and loads the user row. The token's `exp` is
/// what enforces the 48-hour reservation-session window: reservation-kind
/// tokens are minted with exp = iat + 48h, so expiry is detected lazily on
/// the next authenticated action, with no background timer.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
    pub session_kind: SessionKind,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = if let Some(rest) = token.strip_prefix("Bearer ") {
            rest.to_string()
        } else {
            token
        };

        let decoded = match decode::<Claims>(
            &bare_token,
            &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(d) => d,
            Err(e) => {
                // An expired reservation-kind token lands here too; the
                // caller must re-verify through a fresh email link.
                warn!(error = %e, "JWT token validation failed");
                return Err(ApiError::Unauthorized(
                    "Your session has expired or is invalid. Re-open the confirmation link from your email to continue.".into(),
                ));
            }
        };

        let user_id = decoded.claims.sub;
        let session_kind = decoded.claims.kind;

        let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_optional(&app_state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    user_id = %user_id,
                    "Database error during user lookup in authentication"
                );
                ApiError::DatabaseError(e)
            })?;

        match user {
            Some(u) => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    session_kind = ?session_kind,
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    id: u.id,
                    email: u.email,
                    email_verified: u.email_verified == 1,
                    session_kind,
                })
            }
            None => {
                warn!(user_id = %user_id, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
        }
    }
}

/// Like [`AuthedUser`] but never rejects: yields `None` when the request
/// carries no usable identity. Handlers that owe the caller an instructive
/// message (the cancel flow) use this instead of the hard extractor.
pub struct MaybeAuthedUser(pub Option<AuthedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthedUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeAuthedUser(Some(user))),
            Err(ApiError::DatabaseError(e)) => Err(ApiError::DatabaseError(e)),
            Err(ApiError::InternalServer(msg)) => Err(ApiError::InternalServer(msg)),
            Err(_) => Ok(MaybeAuthedUser(None)),
        }
    }
}
