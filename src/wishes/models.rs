// src/wishes/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::reservation::WishStatus;

// ============================================================================
// Wish Models
// ============================================================================

/// Wish database row. `status` is stored as text; [`Wish::status`] is the
/// normalization boundary into the closed [`WishStatus`] enum - the string
/// never leaks past it.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Wish {
    pub id: String,
    pub wishlist_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub images: Option<String>, // JSON array in DB, parsed at the response boundary
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub status: String,
    pub reserved_by: Option<String>,
    pub reserved_by_uid: Option<String>,
    pub reserved_at: Option<String>,
    pub reserver_name: Option<String>,
    pub reserved_message: Option<String>,
    pub purchased_by: Option<String>,
    pub purchased_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Wish {
    pub fn status(&self) -> WishStatus {
        WishStatus::parse(&self.status)
    }

    pub fn images_vec(&self) -> Vec<String> {
        self.images
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_default()
    }
}

/// Owner-facing wish response with parsed image array
#[derive(Serialize, Debug)]
pub struct WishResponse {
    pub id: String,
    pub wishlist_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub images: Vec<String>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub status: WishStatus,
    pub reserved_by: Option<String>,
    pub reserved_at: Option<String>,
    pub reserver_name: Option<String>,
    pub reserved_message: Option<String>,
    pub purchased_by: Option<String>,
    pub purchased_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Wish> for WishResponse {
    fn from(wish: Wish) -> Self {
        let status = wish.status();
        let images = wish.images_vec();
        WishResponse {
            id: wish.id,
            wishlist_id: wish.wishlist_id,
            title: wish.title,
            description: wish.description,
            url: wish.url,
            images,
            notes: wish.notes,
            price: wish.price,
            currency: wish.currency,
            status,
            reserved_by: wish.reserved_by,
            reserved_at: wish.reserved_at,
            reserver_name: wish.reserver_name,
            reserved_message: wish.reserved_message,
            purchased_by: wish.purchased_by,
            purchased_at: wish.purchased_at,
            created_at: wish.created_at,
            updated_at: wish.updated_at,
        }
    }
}

/// Visitor-facing wish shape for the public share view.
///
/// Reservation status renders, but contact emails and stable identity
/// references stay server-side.
#[derive(Serialize, Debug)]
pub struct PublicWishResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub images: Vec<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub status: WishStatus,
    pub reserver_name: Option<String>,
    pub created_at: Option<String>,
}

impl From<Wish> for PublicWishResponse {
    fn from(wish: Wish) -> Self {
        let status = wish.status();
        let images = wish.images_vec();
        PublicWishResponse {
            id: wish.id,
            title: wish.title,
            description: wish.description,
            url: wish.url,
            images,
            price: wish.price,
            currency: wish.currency,
            status,
            reserver_name: wish.reserver_name,
            created_at: wish.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateWish {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub images: Option<Vec<String>>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateWish {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub images: Option<Vec<String>>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
}

/// POST /api/wishes/:id/reserve request body
#[derive(Deserialize)]
pub struct ReserveRequest {
    pub email: String,
    pub name: Option<String>,
    pub message: Option<String>,
}
