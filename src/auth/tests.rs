//! Tests for auth module
//!
//! These tests verify session issuance and the reservation-session expiry
//! rule: reservation-kind tokens are boxed to 48 hours, provider-backed
//! full sessions are exempt from that rule.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::auth::handlers::issue_session_token;
    use crate::auth::models::Claims;
    use chrono::Utc;
    use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

    const SECRET: &str = "test_secret_key";

    fn decode_claims(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|d| d.claims)
    }

    #[test]
    fn test_reservation_session_boxed_to_48_hours() {
        let (token, expires_at) =
            issue_session_token(SECRET, "U_TEST01", SessionKind::Reservation).unwrap();
        let claims = decode_claims(&token).unwrap();

        assert_eq!(claims.kind, SessionKind::Reservation);
        assert_eq!(claims.exp - claims.iat, 48 * 3600);
        assert_eq!(expires_at as usize, claims.exp);
    }

    #[test]
    fn test_full_session_uses_provider_renewal_window() {
        let (token, _) = issue_session_token(SECRET, "U_TEST02", SessionKind::Full).unwrap();
        let claims = decode_claims(&token).unwrap();

        assert_eq!(claims.kind, SessionKind::Full);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_reservation_session_is_rejected() {
        // A reservation session created more than 48 hours ago: exp is in
        // the past, validation must fail - the lazy expiry check.
        let created = Utc::now().timestamp() as usize - 49 * 3600;
        let claims = Claims {
            sub: "U_TEST03".to_string(),
            kind: SessionKind::Reservation,
            iat: created,
            exp: created + 48 * 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(decode_claims(&token).is_err());
    }

    #[test]
    fn test_old_full_session_not_bound_by_48_hour_rule() {
        // A provider-backed session whose token is still within its own
        // validity window decodes fine even if it was first created long
        // ago - the 48-hour rule binds reservation sessions only.
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "U_TEST04".to_string(),
            kind: SessionKind::Full,
            iat: now - 365 * 24 * 3600,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let decoded = decode_claims(&token).unwrap();
        assert_eq!(decoded.kind, SessionKind::Full);
    }

    #[test]
    fn test_jwt_validation_fails_with_wrong_secret() {
        let (token, _) = issue_session_token(SECRET, "U_TEST05", SessionKind::Full).unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"wrong_secret_key"),
            &Validation::new(Algorithm::HS256),
        );

        assert!(
            result.is_err(),
            "Token validation should fail with wrong secret"
        );
    }

    #[test]
    fn test_session_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SessionKind::Reservation).unwrap(),
            "\"reservation\""
        );
        assert_eq!(serde_json::to_string(&SessionKind::Full).unwrap(), "\"full\"");
    }
}
