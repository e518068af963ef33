// src/wishlists/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::wishes::models::PublicWishResponse;

// ============================================================================
// Wishlist Models
// ============================================================================

#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct Wishlist {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub visibility: String,
    pub share_token: Option<String>,
    pub wish_count: i64,
    pub reserved_count: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateWishlist {
    pub name: String,
    pub description: Option<String>,
    pub visibility: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateWishlist {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<String>,
}

/// Response for the public share-token view.
///
/// Owner identity and reserver emails never cross this boundary; visitors
/// only see reservation status and the reserver's display name.
#[derive(Serialize, Debug)]
pub struct PublicWishlistResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub share_token: String,
    pub wish_count: i64,
    pub reserved_count: i64,
    pub wishes: Vec<PublicWishResponse>,
}

#[derive(Serialize, Debug)]
pub struct WishlistListResponse {
    pub wishlists: Vec<Wishlist>,
    pub total: usize,
}
