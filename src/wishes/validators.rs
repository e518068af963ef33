// src/wishes/validators.rs

use super::models::*;
use crate::common::{is_valid_email, ValidationResult, Validator};

// ============================================================================
// Wish Validators
// ============================================================================

pub struct WishValidator;

fn validate_common_fields(
    result: &mut ValidationResult,
    description: &Option<String>,
    url: &Option<String>,
    images: &Option<Vec<String>>,
    notes: &Option<String>,
    price: Option<f64>,
    currency: &Option<String>,
) {
    if let Some(description) = description {
        if description.len() > 5000 {
            result.add_error("description", "Description must be less than 5000 characters");
        }
    }

    if let Some(url) = url {
        if url.len() > 2048 {
            result.add_error("url", "URL must be less than 2048 characters");
        } else if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error("url", "URL must start with http:// or https://");
        }
    }

    if let Some(images) = images {
        if images.len() > 10 {
            result.add_error("images", "A wish can carry at most 10 images");
        }
        for (index, image) in images.iter().enumerate() {
            if image.len() > 2048 {
                result.add_error(&format!("images[{}]", index), "Image URL too long");
            }
        }
    }

    if let Some(notes) = notes {
        if notes.len() > 2000 {
            result.add_error("notes", "Notes must be less than 2000 characters");
        }
    }

    if let Some(price) = price {
        if price < 0.0 || !price.is_finite() {
            result.add_error("price", "Price cannot be negative");
        }
    }

    if let Some(currency) = currency {
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
            result.add_error("currency", "Currency must be a 3-letter ISO code");
        }
    }
}

impl Validator<CreateWish> for WishValidator {
    fn validate(&self, data: &CreateWish) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Wish title is required");
        } else if data.title.len() > 255 {
            result.add_error("title", "Wish title must be less than 255 characters");
        }

        validate_common_fields(
            &mut result,
            &data.description,
            &data.url,
            &data.images,
            &data.notes,
            data.price,
            &data.currency,
        );

        result
    }
}

impl Validator<UpdateWish> for WishValidator {
    fn validate(&self, data: &UpdateWish) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                result.add_error("title", "Wish title cannot be empty");
            } else if title.len() > 255 {
                result.add_error("title", "Wish title must be less than 255 characters");
            }
        }

        validate_common_fields(
            &mut result,
            &data.description,
            &data.url,
            &data.images,
            &data.notes,
            data.price,
            &data.currency,
        );

        result
    }
}

// ============================================================================
// Reservation Validators
// ============================================================================

/// Validates a reserve request before any database work; validation
/// errors never reach the transition.
pub struct ReserveValidator;

impl Validator<ReserveRequest> for ReserveValidator {
    fn validate(&self, data: &ReserveRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required to reserve a wish");
        } else if !is_valid_email(data.email.trim()) {
            result.add_error("email", "A valid email address is required");
        }

        if let Some(name) = &data.name {
            if name.len() > 255 {
                result.add_error("name", "Name must be less than 255 characters");
            }
        }

        if let Some(message) = &data.message {
            if message.len() > 1000 {
                result.add_error("message", "Message must be less than 1000 characters");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_requires_valid_email() {
        let validator = ReserveValidator;

        let bad = ReserveRequest {
            email: "not-an-email".to_string(),
            name: None,
            message: None,
        };
        assert!(!validator.validate(&bad).is_valid);

        let good = ReserveRequest {
            email: "friend@example.com".to_string(),
            name: Some("Friend".to_string()),
            message: Some("Don't tell them!".to_string()),
        };
        assert!(validator.validate(&good).is_valid);
    }

    #[test]
    fn test_create_wish_requires_title() {
        let validator = WishValidator;
        let wish = CreateWish {
            title: "   ".to_string(),
            description: None,
            url: None,
            images: None,
            notes: None,
            price: None,
            currency: None,
        };
        let result = validator.validate(&wish);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "title");
    }

    #[test]
    fn test_create_wish_rejects_negative_price_and_bad_currency() {
        let validator = WishValidator;
        let wish = CreateWish {
            title: "Nike Air Max 90".to_string(),
            description: None,
            url: Some("ftp://example.com".to_string()),
            images: None,
            notes: None,
            price: Some(-5.0),
            currency: Some("usd".to_string()),
        };
        let result = validator.validate(&wish);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"price"));
        assert!(fields.contains(&"currency"));
        assert!(fields.contains(&"url"));
    }
}
