// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., W_K7NP3X for wishes)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Wishlist (L_)
    Wishlist,
    /// Wish (W_)
    Wish,
    /// Sign-in token (K_) - K for Key
    Token,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Wishlist => "L",
            EntityPrefix::Wish => "W",
            EntityPrefix::Token => "K",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Returns
/// A string in format "PREFIX_XXXXXX" (e.g., "W_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix
/// Useful for share tokens and sign-in tokens
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Wishlist ID (L_XXXXXX)
pub fn generate_wishlist_id() -> String {
    generate_id(EntityPrefix::Wishlist)
}

/// Generate a Wish ID (W_XXXXXX)
pub fn generate_wish_id() -> String {
    generate_id(EntityPrefix::Wish)
}

/// Generate a sign-in token (K_ followed by 32 random characters)
///
/// Sign-in tokens travel in emailed links, so they carry far more entropy
/// than entity IDs.
pub fn generate_signin_token() -> String {
    format!(
        "{}_{}",
        EntityPrefix::Token.as_str(),
        generate_crockford_string(32)
    )
}

/// Generate an opaque wishlist share token (16 random characters, no prefix)
pub fn generate_share_token() -> String {
    generate_crockford_string(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_id_format() {
        let id = generate_wish_id();
        assert!(id.starts_with("W_"));
        assert_eq!(id.len(), 8);
        assert!(id[2..]
            .bytes()
            .all(|b| CROCKFORD_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_share_token_length_and_alphabet() {
        let token = generate_share_token();
        assert_eq!(token.len(), 16);
        assert!(token.bytes().all(|b| CROCKFORD_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_signin_token_entropy() {
        let token = generate_signin_token();
        assert!(token.starts_with("K_"));
        assert_eq!(token.len(), 34);
        // Two draws colliding would mean the generator is broken
        assert_ne!(generate_signin_token(), token);
    }
}
