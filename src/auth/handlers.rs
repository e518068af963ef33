//! Authentication handlers
//!
//! Two ways into a session:
//! - Google ID token -> full session (provider-backed, exempt from the
//!   48-hour reservation-session rule)
//! - passwordless sign-in link -> reservation session, time-boxed to 48h,
//!   used by anonymous visitors who only want to hold a gift

use axum::extract::{Extension, Json};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::extractors::AuthedUser;
use super::models::{
    Claims, CompleteSignIn, GoogleIdTokenPayload, PendingReservation, SendSignInLink, SessionKind,
    SignInToken, User,
};
use crate::common::{
    generate_signin_token, generate_user_id, is_valid_email, safe_email_log, ApiError, AppState,
};

/// Reservation-only sessions expire 48 hours after creation.
const RESERVATION_SESSION_HOURS: i64 = 48;
/// Full sessions renew on the provider's ordinary cadence.
const FULL_SESSION_HOURS: i64 = 24;
/// Emailed sign-in links are single-use and short-lived.
const SIGNIN_TOKEN_MINUTES: i64 = 60;

/// Mint a session JWT. The `kind` claim decides the expiry window: this is
/// the only place the 48-hour box is set, everything else reads it lazily
/// from `exp`.
pub fn issue_session_token(
    jwt_secret: &str,
    user_id: &str,
    kind: SessionKind,
) -> Result<(String, i64), ApiError> {
    let now = Utc::now();
    let hours = match kind {
        SessionKind::Full => FULL_SESSION_HOURS,
        SessionKind::Reservation => RESERVATION_SESSION_HOURS,
    };
    let expires_at = now + Duration::hours(hours);

    let claims = Claims {
        sub: user_id.to_string(),
        kind,
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error");
        ApiError::InternalServer("jwt error".to_string())
    })?;

    Ok((token, expires_at.timestamp()))
}

/// POST /api/auth/google
/// Authenticates a user via a Google OAuth ID token and issues a full
/// session.
pub async fn google_auth(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("Received Google auth request");
    let state = state_lock.read().await.clone();

    // Verify token with Google's tokeninfo endpoint
    // Docs: https://developers.google.com/identity/sign-in/web/backend-auth
    let tokeninfo_url = format!(
        "https://oauth2.googleapis.com/tokeninfo?id_token={}",
        payload.id_token
    );

    let resp = state.http.get(&tokeninfo_url).send().await;
    let body = match resp {
        Ok(r) => {
            let status = r.status();
            debug!(http_status = %status, "Received response from Google tokeninfo endpoint");

            if status.is_success() {
                r.json::<serde_json::Value>().await.map_err(|e| {
                    error!(error = %e, "Failed to parse Google tokeninfo JSON response");
                    ApiError::BadRequest("malformed id_token".to_string())
                })?
            } else {
                match status.as_u16() {
                    400 => {
                        warn!(http_status = %status, "Google tokeninfo returned 400");
                        return Err(ApiError::BadRequest(
                            "invalid or malformed id_token".to_string(),
                        ));
                    }
                    401 => {
                        warn!(http_status = %status, "Google tokeninfo returned 401");
                        return Err(ApiError::Unauthorized(
                            "expired or invalid id_token".to_string(),
                        ));
                    }
                    _ => {
                        warn!(http_status = %status, "Google tokeninfo returned error status");
                        return Err(ApiError::BadRequest(
                            "id_token validation failed".to_string(),
                        ));
                    }
                }
            }
        }
        Err(e) => {
            error!(error = %e, "HTTP error contacting Google tokeninfo endpoint");
            return Err(ApiError::ServiceUnavailable(
                "google token validation service unavailable".to_string(),
            ));
        }
    };

    let email = body
        .get("email")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let sub = body.get("sub").and_then(|v| v.as_str()).map(str::to_string);
    let name = body
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let picture = body
        .get("picture")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    if email.is_none() || sub.is_none() {
        warn!(
            has_email = email.is_some(),
            has_sub = sub.is_some(),
            "Google token missing required fields (email/sub)"
        );
        return Err(ApiError::BadRequest(
            "token missing required fields".to_string(),
        ));
    }

    // A reservation must be backed by a verified email, so the provider's
    // verification flag is load-bearing here, not advisory.
    let email_verified = body
        .get("email_verified")
        .map(|v| v.as_bool().unwrap_or(v.as_str() == Some("true")))
        .unwrap_or(false);
    if !email_verified {
        warn!("Google token contains unverified email address - rejecting");
        return Err(ApiError::Unauthorized(
            "email address is not verified with Google".to_string(),
        ));
    }

    if let Some(exp) = body
        .get("exp")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .or_else(|| body.get("exp").and_then(|v| v.as_i64()))
    {
        if exp < Utc::now().timestamp() {
            warn!(token_exp = exp, "Google token has expired");
            return Err(ApiError::Unauthorized("token has expired".to_string()));
        }
    }

    // Validate audience (client id) when configured
    if let Some(client_id) = &state.google_client_id {
        match body.get("aud").and_then(|v| v.as_str()) {
            Some(aud_val) if aud_val == client_id => {
                debug!("Google token audience validation successful");
            }
            Some(aud_val) => {
                warn!(
                    token_audience = %aud_val,
                    "Google token audience validation failed - rejecting token"
                );
                return Err(ApiError::Unauthorized(
                    "token audience mismatch".to_string(),
                ));
            }
            None => {
                warn!("Google token missing audience field - rejecting token");
                return Err(ApiError::Unauthorized("token missing audience".to_string()));
            }
        }
    }

    let email = email.unwrap();
    let sub = sub.unwrap();

    debug!(
        email = %safe_email_log(&email),
        provider = "google",
        "Google token validation successful, proceeding with user lookup"
    );

    let user = upsert_provider_user(&state, &email, name.as_deref(), picture.as_deref(), &sub)
        .await?;

    let (token, expires_at) = issue_session_token(&state.jwt_secret, &user.id, SessionKind::Full)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    Ok(Json(serde_json::json!({
        "token": token,
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "avatar": user.avatar,
        },
        "session": {
            "kind": "full",
            "expires_at": expires_at,
        },
    })))
}

/// POST /api/auth/signin-link
/// First half of the passwordless flow: store a one-time token (with the
/// optional pending reservation riding along) and email the link. The
/// response never reveals whether the address already has an account.
pub async fn send_sign_in_link(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<SendSignInLink>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::ValidationError(
            "email: A valid email address is required".to_string(),
        ));
    }
    if !payload.redirect_url.starts_with("http://") && !payload.redirect_url.starts_with("https://")
    {
        return Err(ApiError::ValidationError(
            "redirect_url: Must be an absolute http(s) URL".to_string(),
        ));
    }

    let token = generate_signin_token();
    let expires_at = (Utc::now() + Duration::minutes(SIGNIN_TOKEN_MINUTES))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let (pending_share_token, pending_wish_id) = match &payload.pending {
        Some(p) => (Some(p.share_token.clone()), Some(p.wish_id.clone())),
        None => (None, None),
    };

    sqlx::query(
        r#"
        INSERT INTO signin_tokens (token, email, redirect_url, pending_share_token, pending_wish_id, expires_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&token)
    .bind(&email)
    .bind(&payload.redirect_url)
    .bind(&pending_share_token)
    .bind(&pending_wish_id)
    .bind(&expires_at)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let separator = if payload.redirect_url.contains('?') { "&" } else { "?" };
    let link = format!(
        "{}{}signin_token={}&email={}",
        payload.redirect_url,
        separator,
        token,
        urlencoding::encode(&email)
    );

    state
        .email_service
        .send_sign_in_link(&email, &link)
        .await
        .map_err(|e| {
            error!(error = %e, email = %safe_email_log(&email), "Failed to dispatch sign-in link");
            ApiError::ServiceUnavailable("could not send sign-in email".to_string())
        })?;

    info!(
        email = %safe_email_log(&email),
        has_pending = payload.pending.is_some(),
        "Sign-in link dispatched"
    );

    Ok(Json(serde_json::json!({
        "message": "If that address is reachable, a sign-in link is on its way."
    })))
}

/// POST /api/auth/signin-link/complete
/// Second half of the passwordless flow: consume the emailed token, mark
/// the email verified, and issue a 48-hour reservation session. The pending
/// reservation payload is echoed back verbatim - the server never applies
/// it, the client must re-confirm intent.
pub async fn complete_sign_in(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<CompleteSignIn>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let email = payload.email.trim().to_lowercase();

    let row: Option<SignInToken> =
        sqlx::query_as::<_, SignInToken>("SELECT * FROM signin_tokens WHERE token = ?")
            .bind(&payload.token)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    let row = match row {
        Some(r) => r,
        None => {
            warn!("Sign-in completion with unknown token");
            return Err(ApiError::Unauthorized("invalid sign-in link".to_string()));
        }
    };

    if row.consumed_at.is_some() {
        warn!(email = %safe_email_log(&email), "Sign-in token replayed after consumption");
        return Err(ApiError::Unauthorized(
            "this sign-in link was already used".to_string(),
        ));
    }

    if row.email != email {
        warn!(
            token_email = %safe_email_log(&row.email),
            claimed_email = %safe_email_log(&email),
            "Sign-in completion email mismatch"
        );
        return Err(ApiError::Unauthorized(
            "this link was issued for a different email address".to_string(),
        ));
    }

    let expires = chrono::NaiveDateTime::parse_from_str(&row.expires_at, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| {
            error!(error = %e, "Corrupt expires_at on sign-in token");
            ApiError::InternalServer("corrupt sign-in token".to_string())
        })?;
    if expires < Utc::now().naive_utc() {
        return Err(ApiError::Unauthorized(
            "this sign-in link has expired; request a new one".to_string(),
        ));
    }

    sqlx::query("UPDATE signin_tokens SET consumed_at = datetime('now') WHERE token = ?")
        .bind(&payload.token)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let user = upsert_email_link_user(&state, &email).await?;

    let (token, expires_at) =
        issue_session_token(&state.jwt_secret, &user.id, SessionKind::Reservation)?;

    let pending = match (row.pending_share_token, row.pending_wish_id) {
        (Some(share_token), Some(wish_id)) => Some(PendingReservation {
            share_token,
            wish_id,
        }),
        _ => None,
    };

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        has_pending = pending.is_some(),
        "Reservation session established via sign-in link"
    );

    Ok(Json(serde_json::json!({
        "token": token,
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
        },
        "session": {
            "kind": "reservation",
            "expires_at": expires_at,
        },
        "pending_reservation": pending,
    })))
}

/// GET /api/me
/// Returns the current authenticated user's information
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(serde_json::json!({
        "user": user,
        "session_kind": authed.session_kind,
    })))
}

/// POST /api/auth/logout
/// JWT sessions end client-side; this endpoint only confirms the request.
pub async fn logout_handler(_authed: AuthedUser) -> Result<Json<serde_json::Value>, ApiError> {
    info!("User logout successful");
    Ok(Json(serde_json::json!({
        "message": "Logout successful"
    })))
}

// ---- Helper Functions ----

async fn upsert_provider_user(
    state: &AppState,
    email: &str,
    name: Option<&str>,
    picture: Option<&str>,
    provider_id: &str,
) -> Result<User, ApiError> {
    let existing: Option<User> = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE provider = ? AND provider_id = ?",
    )
    .bind("google")
    .bind(provider_id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if let Some(u) = existing {
        return Ok(u);
    }

    // An email-link user upgrading to a provider account keeps their id, so
    // any wishes they reserved stay cancellable under the strict UID rule.
    let by_email: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if let Some(u) = by_email {
        sqlx::query(
            "UPDATE users SET provider = ?, provider_id = ?, name = COALESCE(?, name), avatar = COALESCE(?, avatar), email_verified = 1 WHERE id = ?",
        )
        .bind("google")
        .bind(provider_id)
        .bind(name)
        .bind(picture)
        .bind(&u.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(user_id = %u.id, "Linked existing email-link account to Google provider");

        return sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&u.id)
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError);
    }

    let id = generate_user_id();
    info!(
        user_id = %id,
        email = %safe_email_log(email),
        provider = "google",
        "Creating new user account via Google OAuth"
    );

    sqlx::query(
        "INSERT OR IGNORE INTO users (id, email, name, avatar, provider, provider_id, email_verified) VALUES (?, ?, ?, ?, ?, ?, 1)",
    )
    .bind(&id)
    .bind(email)
    .bind(name)
    .bind(picture)
    .bind("google")
    .bind(provider_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)
}

async fn upsert_email_link_user(state: &AppState, email: &str) -> Result<User, ApiError> {
    let existing: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if let Some(u) = existing {
        if u.email_verified != 1 {
            sqlx::query("UPDATE users SET email_verified = 1 WHERE id = ?")
                .bind(&u.id)
                .execute(&state.db)
                .await
                .map_err(ApiError::DatabaseError)?;
        }
        return sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&u.id)
            .fetch_one(&state.db)
            .await
            .map_err(ApiError::DatabaseError);
    }

    let id = generate_user_id();
    info!(
        user_id = %id,
        email = %safe_email_log(email),
        provider = "email_link",
        "Creating reservation-only user account via sign-in link"
    );

    sqlx::query(
        "INSERT OR IGNORE INTO users (id, email, provider, email_verified) VALUES (?, ?, 'email_link', 1)",
    )
    .bind(&id)
    .bind(email)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)
}
