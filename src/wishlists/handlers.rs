// src/wishlists/handlers.rs

use axum::{
    extract::{Extension, Path},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::*;
use super::validators::WishlistValidator;
use crate::auth::AuthedUser;
use crate::common::{
    generate_share_token, generate_wishlist_id, ApiError, AppState, Validator,
};
use crate::wishes::models::{PublicWishResponse, Wish};

/// POST /api/wishlists - Create a wishlist owned by the caller
pub async fn create_wishlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<CreateWishlist>,
) -> Result<Json<Wishlist>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = WishlistValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let id = generate_wishlist_id();
    let visibility = payload.visibility.unwrap_or_else(|| "private".to_string());

    sqlx::query(
        "INSERT INTO wishlists (id, owner_id, name, description, visibility) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&authed.id)
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(&visibility)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let wishlist = fetch_wishlist(&state, &id).await?;

    info!(wishlist_id = %id, owner_id = %authed.id, "Wishlist created");

    Ok(Json(wishlist))
}

/// GET /api/wishlists - List the caller's wishlists
pub async fn list_my_wishlists(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<WishlistListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let wishlists = sqlx::query_as::<_, Wishlist>(
        "SELECT * FROM wishlists WHERE owner_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let total = wishlists.len();
    Ok(Json(WishlistListResponse { wishlists, total }))
}

/// GET /api/wishlists/:id - Owner view of one wishlist
pub async fn get_wishlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wishlist_id): Path<String>,
) -> Result<Json<Wishlist>, ApiError> {
    let state = state_lock.read().await.clone();
    let wishlist = require_owned(&state, &wishlist_id, &authed.id).await?;
    Ok(Json(wishlist))
}

/// PATCH /api/wishlists/:id - Update name/description/visibility
pub async fn update_wishlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wishlist_id): Path<String>,
    Json(payload): Json<UpdateWishlist>,
) -> Result<Json<Wishlist>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = WishlistValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    require_owned(&state, &wishlist_id, &authed.id).await?;

    sqlx::query(
        r#"
        UPDATE wishlists SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            visibility = COALESCE(?, visibility),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(payload.name.as_deref().map(str::trim))
    .bind(&payload.description)
    .bind(&payload.visibility)
    .bind(&wishlist_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let wishlist = fetch_wishlist(&state, &wishlist_id).await?;
    Ok(Json(wishlist))
}

/// DELETE /api/wishlists/:id - Delete a wishlist and its wishes
pub async fn delete_wishlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wishlist_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    require_owned(&state, &wishlist_id, &authed.id).await?;

    // Explicit child delete; sqlite cascade depends on a pragma we don't
    // want to rely on.
    sqlx::query("DELETE FROM wishes WHERE wishlist_id = ?")
        .bind(&wishlist_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    sqlx::query("DELETE FROM wishlists WHERE id = ?")
        .bind(&wishlist_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(wishlist_id = %wishlist_id, "Wishlist deleted");

    Ok(Json(serde_json::json!({ "message": "Wishlist deleted" })))
}

/// POST /api/wishlists/:id/share - Make the list shareable.
///
/// Mints the opaque share token on first call and keeps it on repeats, so
/// previously shared links stay valid.
pub async fn share_wishlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(wishlist_id): Path<String>,
) -> Result<Json<Wishlist>, ApiError> {
    let state = state_lock.read().await.clone();

    let wishlist = require_owned(&state, &wishlist_id, &authed.id).await?;

    let share_token = match wishlist.share_token {
        Some(existing) => existing,
        None => generate_share_token(),
    };

    sqlx::query(
        "UPDATE wishlists SET share_token = ?, visibility = 'public', updated_at = datetime('now') WHERE id = ?",
    )
    .bind(&share_token)
    .bind(&wishlist_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let updated = fetch_wishlist(&state, &wishlist_id).await?;

    info!(wishlist_id = %wishlist_id, "Wishlist sharing enabled");

    Ok(Json(updated))
}

/// GET /api/public/wishlists/:share_token - Visitor view by share token.
///
/// 404 when no list carries the token; 403 when the list was made private
/// after the link went out. No authentication required.
pub async fn get_public_wishlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(share_token): Path<String>,
) -> Result<Json<PublicWishlistResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let wishlist = sqlx::query_as::<_, Wishlist>("SELECT * FROM wishlists WHERE share_token = ?")
        .bind(&share_token)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("wishlist not found".to_string()))?;

    if wishlist.visibility == "private" {
        return Err(ApiError::Forbidden(
            "This wishlist is no longer shared".to_string(),
        ));
    }

    let wishes = sqlx::query_as::<_, Wish>(
        "SELECT * FROM wishes WHERE wishlist_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(&wishlist.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(PublicWishlistResponse {
        id: wishlist.id,
        name: wishlist.name,
        description: wishlist.description,
        share_token,
        wish_count: wishlist.wish_count,
        reserved_count: wishlist.reserved_count,
        wishes: wishes.into_iter().map(PublicWishResponse::from).collect(),
    }))
}

// ---- Helper Functions ----

async fn fetch_wishlist(state: &AppState, wishlist_id: &str) -> Result<Wishlist, ApiError> {
    sqlx::query_as::<_, Wishlist>("SELECT * FROM wishlists WHERE id = ?")
        .bind(wishlist_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("wishlist not found".to_string()))
}

async fn require_owned(
    state: &AppState,
    wishlist_id: &str,
    owner_id: &str,
) -> Result<Wishlist, ApiError> {
    let wishlist = fetch_wishlist(state, wishlist_id).await?;
    if wishlist.owner_id != owner_id {
        return Err(ApiError::Forbidden(
            "You do not own this wishlist".to_string(),
        ));
    }
    Ok(wishlist)
}
