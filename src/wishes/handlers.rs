// src/wishes/handlers.rs

use axum::{
    extract::{Extension, Path},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::*;
use super::reservation::{
    self, CallerIdentity, CancelAuthorization, ReservationClaim, TransitionError,
};
use super::validators::{ReserveValidator, WishValidator};
use crate::auth::{AuthedUser, MaybeAuthedUser};
use crate::common::{generate_wish_id, safe_email_log, ApiError, AppState, Validator};
use crate::wishlists::models::Wishlist;

const CONFLICT_MESSAGE: &str = "Someone just reserved this wish. Pick another item.";
const NO_SESSION_MESSAGE: &str =
    "No verified session found. Re-open the confirmation link from your email to manage this reservation.";

/// POST /api/wishlists/:id/wishes - Add a wish (manual entry or scraped
/// fields, the extension popup and the web form both land here)
pub async fn create_wish(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wishlist_id): Path<String>,
    Json(payload): Json<CreateWish>,
) -> Result<Json<WishResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = WishValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let wishlist = require_owned_wishlist(&state, &wishlist_id, &authed.id).await?;

    let id = generate_wish_id();
    let images_json = payload
        .images
        .as_ref()
        .map(|images| serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string()));
    let currency = payload.currency.unwrap_or_else(|| "USD".to_string());

    sqlx::query(
        r#"
        INSERT INTO wishes (id, wishlist_id, title, description, url, images, notes, price, currency)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&wishlist.id)
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(&payload.url)
    .bind(&images_json)
    .bind(&payload.notes)
    .bind(payload.price)
    .bind(&currency)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    sqlx::query(
        "UPDATE wishlists SET wish_count = wish_count + 1, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(&wishlist.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let wish = fetch_wish(&state, &id).await?;

    info!(wish_id = %wish.id, wishlist_id = %wishlist.id, "Wish created");

    Ok(Json(wish.into()))
}

/// GET /api/wishlists/:id/wishes - Owner view of a wishlist's wishes
pub async fn list_wishes(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wishlist_id): Path<String>,
) -> Result<Json<Vec<WishResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let wishlist = require_owned_wishlist(&state, &wishlist_id, &authed.id).await?;

    let wishes = sqlx::query_as::<_, Wish>(
        "SELECT * FROM wishes WHERE wishlist_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(&wishlist.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(wishes.into_iter().map(WishResponse::from).collect()))
}

/// PATCH /api/wishes/:id - Owner edits wish details. Reservation and
/// purchase fields are not editable through this endpoint.
pub async fn update_wish(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wish_id): Path<String>,
    Json(payload): Json<UpdateWish>,
) -> Result<Json<WishResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = WishValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let wish = fetch_wish(&state, &wish_id).await?;
    require_owned_wishlist(&state, &wish.wishlist_id, &authed.id).await?;

    let images_json = payload
        .images
        .as_ref()
        .map(|images| serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string()));

    sqlx::query(
        r#"
        UPDATE wishes SET
            title = COALESCE(?, title),
            description = COALESCE(?, description),
            url = COALESCE(?, url),
            images = COALESCE(?, images),
            notes = COALESCE(?, notes),
            price = COALESCE(?, price),
            currency = COALESCE(?, currency),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(payload.title.as_deref().map(str::trim))
    .bind(&payload.description)
    .bind(&payload.url)
    .bind(&images_json)
    .bind(&payload.notes)
    .bind(payload.price)
    .bind(&payload.currency)
    .bind(&wish_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let updated = fetch_wish(&state, &wish_id).await?;
    Ok(Json(updated.into()))
}

/// DELETE /api/wishes/:id - Owner removes a wish; counters follow.
pub async fn delete_wish(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wish_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let wish = fetch_wish(&state, &wish_id).await?;
    let wishlist = require_owned_wishlist(&state, &wish.wishlist_id, &authed.id).await?;

    sqlx::query("DELETE FROM wishes WHERE id = ?")
        .bind(&wish_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let reserved_delta = reservation::cancel_count_delta(wish.status());
    sqlx::query(
        r#"
        UPDATE wishlists SET
            wish_count = MAX(wish_count - 1, 0),
            reserved_count = MAX(reserved_count + ?, 0),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(reserved_delta)
    .bind(&wishlist.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(wish_id = %wish_id, wishlist_id = %wishlist.id, "Wish deleted");

    Ok(Json(serde_json::json!({ "message": "Wish deleted" })))
}

/// POST /api/wishes/:id/reserve - The reserve transition.
///
/// Requires a verified session; the body email must be the session's
/// verified email. The single-row conditional UPDATE is the backstop
/// against cross-client races: exactly one caller wins, the loser gets 409.
pub async fn reserve_wish(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wish_id): Path<String>,
    Json(payload): Json<ReserveRequest>,
) -> Result<Json<WishResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = ReserveValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    if !authed.email_verified {
        return Err(ApiError::Unauthorized(
            "Your email is not verified. Check your inbox for the confirmation link.".to_string(),
        ));
    }

    let email = payload.email.trim().to_lowercase();
    if !email.eq_ignore_ascii_case(&authed.email) {
        // A reservation must be backed by the verified email of the
        // session holding it, not an arbitrary address.
        return Err(ApiError::ValidationError(
            "email: Must match the email you verified".to_string(),
        ));
    }

    let wish = fetch_wish(&state, &wish_id).await?;
    let prev_status = wish.status();

    let claim = ReservationClaim {
        email: email.clone(),
        uid: authed.id.clone(),
        reserver_name: payload.name.clone(),
        message: payload.message.clone(),
    };

    let next = reservation::reserve(&wish, &claim).map_err(|e| match e {
        TransitionError::Conflict(_) => ApiError::Conflict(CONFLICT_MESSAGE.to_string()),
        _ => ApiError::InternalServer("unexpected transition failure".to_string()),
    })?;

    // Conditional single-row update: loses cleanly if another request got
    // here between our read and this write.
    let updated = sqlx::query(
        r#"
        UPDATE wishes SET
            status = 'reserved',
            reserved_by = ?,
            reserved_by_uid = ?,
            reserved_at = datetime('now'),
            reserver_name = ?,
            reserved_message = ?,
            updated_at = datetime('now')
        WHERE id = ? AND status = 'available'
        "#,
    )
    .bind(&next.reserved_by)
    .bind(&next.reserved_by_uid)
    .bind(&next.reserver_name)
    .bind(&next.reserved_message)
    .bind(&wish_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if updated.rows_affected() == 0 {
        warn!(wish_id = %wish_id, "Reserve lost the race - wish no longer available");
        return Err(ApiError::Conflict(CONFLICT_MESSAGE.to_string()));
    }

    let delta = reservation::reserve_count_delta(prev_status);
    if delta != 0 {
        sqlx::query(
            "UPDATE wishlists SET reserved_count = reserved_count + ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(delta)
        .bind(&wish.wishlist_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;
    }

    // Respond with the re-fetched row so the client reconciles against
    // server truth instead of its optimistic view.
    let reserved = fetch_wish(&state, &wish_id).await?;

    info!(
        wish_id = %wish_id,
        reserved_by = %safe_email_log(&email),
        "Wish reserved"
    );

    Ok(Json(reserved.into()))
}

/// POST /api/wishes/:id/cancel-reservation - The cancel transition.
///
/// Authorization: the caller's stable identity must match the recorded
/// reserver UID, or (legacy records only) their verified email must match
/// the recorded email-shaped contact.
pub async fn cancel_reservation(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    MaybeAuthedUser(authed): MaybeAuthedUser,
    Path(wish_id): Path<String>,
) -> Result<Json<WishResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    // An absent or expired session gets the instructive message rather
    // than a bare 401: re-verification happens through the emailed link.
    let authed = authed.ok_or_else(|| ApiError::Unauthorized(NO_SESSION_MESSAGE.to_string()))?;

    if !authed.email_verified {
        return Err(ApiError::Unauthorized(NO_SESSION_MESSAGE.to_string()));
    }

    let wish = fetch_wish(&state, &wish_id).await?;

    let caller = CallerIdentity {
        uid: authed.id.clone(),
        email: authed.email.clone(),
    };
    let authorization = reservation::authorize_cancel(&caller, &wish);
    if authorization == CancelAuthorization::Denied {
        warn!(
            wish_id = %wish_id,
            caller_uid = %authed.id,
            "Cancel rejected - caller is not the reserver"
        );
        return Err(ApiError::Forbidden(
            "Only the person who reserved this wish can cancel the reservation.".to_string(),
        ));
    }

    reservation::cancel(&wish, authorization).map_err(|e| match e {
        TransitionError::NotReserved(_) => {
            ApiError::Conflict("This wish is not currently reserved.".to_string())
        }
        _ => ApiError::InternalServer("unexpected transition failure".to_string()),
    })?;

    let updated = sqlx::query(
        r#"
        UPDATE wishes SET
            status = 'available',
            reserved_by = NULL,
            reserved_by_uid = NULL,
            reserved_at = NULL,
            reserver_name = NULL,
            reserved_message = NULL,
            updated_at = datetime('now')
        WHERE id = ? AND status = 'reserved'
        "#,
    )
    .bind(&wish_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "This wish is not currently reserved.".to_string(),
        ));
    }

    // Decrement floored at zero
    sqlx::query(
        "UPDATE wishlists SET reserved_count = MAX(reserved_count - 1, 0), updated_at = datetime('now') WHERE id = ?",
    )
    .bind(&wish.wishlist_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let cleared = fetch_wish(&state, &wish_id).await?;

    info!(wish_id = %wish_id, caller_uid = %authed.id, "Reservation cancelled");

    Ok(Json(cleared.into()))
}

// ---- Helper Functions ----

async fn fetch_wish(state: &AppState, wish_id: &str) -> Result<Wish, ApiError> {
    sqlx::query_as::<_, Wish>("SELECT * FROM wishes WHERE id = ?")
        .bind(wish_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("wish not found".to_string()))
}

async fn require_owned_wishlist(
    state: &AppState,
    wishlist_id: &str,
    owner_id: &str,
) -> Result<Wishlist, ApiError> {
    let wishlist = sqlx::query_as::<_, Wishlist>("SELECT * FROM wishlists WHERE id = ?")
        .bind(wishlist_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("wishlist not found".to_string()))?;

    if wishlist.owner_id != owner_id {
        return Err(ApiError::Forbidden(
            "You do not own this wishlist".to_string(),
        ));
    }

    Ok(wishlist)
}
