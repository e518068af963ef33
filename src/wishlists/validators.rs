// src/wishlists/validators.rs

use super::models::*;
use crate::common::{ValidationResult, Validator};
use std::collections::HashSet;

fn valid_visibilities() -> HashSet<&'static str> {
    HashSet::from(["private", "friends", "public"])
}

// ============================================================================
// Wishlist Validators
// ============================================================================

pub struct WishlistValidator;

impl Validator<CreateWishlist> for WishlistValidator {
    fn validate(&self, data: &CreateWishlist) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Wishlist name is required");
        } else if data.name.len() > 255 {
            result.add_error("name", "Wishlist name must be less than 255 characters");
        }

        if let Some(description) = &data.description {
            if description.len() > 2000 {
                result.add_error(
                    "description",
                    "Description must be less than 2000 characters",
                );
            }
        }

        if let Some(visibility) = &data.visibility {
            if !valid_visibilities().contains(visibility.as_str()) {
                result.add_error("visibility", "Invalid visibility");
            }
        }

        result
    }
}

impl Validator<UpdateWishlist> for WishlistValidator {
    fn validate(&self, data: &UpdateWishlist) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                result.add_error("name", "Wishlist name cannot be empty");
            } else if name.len() > 255 {
                result.add_error("name", "Wishlist name must be less than 255 characters");
            }
        }

        if let Some(description) = &data.description {
            if description.len() > 2000 {
                result.add_error(
                    "description",
                    "Description must be less than 2000 characters",
                );
            }
        }

        if let Some(visibility) = &data.visibility {
            if !valid_visibilities().contains(visibility.as_str()) {
                result.add_error("visibility", "Invalid visibility");
            }
        }

        result
    }
}
