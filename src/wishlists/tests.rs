//! Tests for wishlists module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::Validator;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .unwrap();

        crate::common::migrations::run_migrations(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO users (id, email, provider, email_verified) VALUES ('U_OWNER1', 'owner@example.com', 'google', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[tokio::test]
    async fn test_wishlist_defaults_to_private_with_zero_counters() {
        let pool = setup_test_db().await;

        sqlx::query("INSERT INTO wishlists (id, owner_id, name) VALUES ('L_TEST01', 'U_OWNER1', 'Birthday')")
            .execute(&pool)
            .await
            .unwrap();

        let wishlist =
            sqlx::query_as::<_, models::Wishlist>("SELECT * FROM wishlists WHERE id = 'L_TEST01'")
                .fetch_one(&pool)
                .await
                .unwrap();

        assert_eq!(wishlist.visibility, "private");
        assert_eq!(wishlist.share_token, None);
        assert_eq!(wishlist.wish_count, 0);
        assert_eq!(wishlist.reserved_count, 0);
    }

    #[tokio::test]
    async fn test_share_token_lookup_ignores_visibility_changes() {
        let pool = setup_test_db().await;

        sqlx::query(
            "INSERT INTO wishlists (id, owner_id, name, visibility, share_token) VALUES ('L_TEST01', 'U_OWNER1', 'Birthday', 'public', 'SHARETOKEN123456')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Unknown token finds nothing
        let missing = sqlx::query_as::<_, models::Wishlist>(
            "SELECT * FROM wishlists WHERE share_token = ?",
        )
        .bind("NOSUCHTOKEN00000")
        .fetch_optional(&pool)
        .await
        .unwrap();
        assert!(missing.is_none());

        // Known token still resolves after the owner flips visibility back;
        // the handler layer decides whether a private list is served (403)
        sqlx::query("UPDATE wishlists SET visibility = 'private' WHERE id = 'L_TEST01'")
            .execute(&pool)
            .await
            .unwrap();

        let found = sqlx::query_as::<_, models::Wishlist>(
            "SELECT * FROM wishlists WHERE share_token = ?",
        )
        .bind("SHARETOKEN123456")
        .fetch_optional(&pool)
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.id, "L_TEST01");
        assert_eq!(found.visibility, "private");
    }

    #[tokio::test]
    async fn test_deleting_wishlist_removes_its_wishes() {
        let pool = setup_test_db().await;

        sqlx::query("INSERT INTO wishlists (id, owner_id, name) VALUES ('L_TEST01', 'U_OWNER1', 'Birthday')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO wishes (id, wishlist_id, title) VALUES ('W_TEST01', 'L_TEST01', 'Lego set')")
            .execute(&pool)
            .await
            .unwrap();

        // Same order as delete_wishlist: children first, then the list
        sqlx::query("DELETE FROM wishes WHERE wishlist_id = 'L_TEST01'")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM wishlists WHERE id = 'L_TEST01'")
            .execute(&pool)
            .await
            .unwrap();

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM wishes WHERE wishlist_id = 'L_TEST01'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_public_response_omits_owner_identity() {
        let response = models::PublicWishlistResponse {
            id: "L_TEST01".to_string(),
            name: "Birthday".to_string(),
            description: None,
            share_token: "SHARETOKEN123456".to_string(),
            wish_count: 3,
            reserved_count: 1,
            wishes: vec![],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("owner_id").is_none());
        assert_eq!(json["share_token"], "SHARETOKEN123456");
        assert_eq!(json["reserved_count"], 1);
    }

    #[test]
    fn test_validator_rejects_unknown_visibility() {
        let validator = validators::WishlistValidator;

        let wishlist = models::CreateWishlist {
            name: "Birthday".to_string(),
            description: None,
            visibility: Some("everyone".to_string()),
        };
        let result = validator.validate(&wishlist);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "visibility");

        for visibility in ["private", "friends", "public"] {
            let wishlist = models::CreateWishlist {
                name: "Birthday".to_string(),
                description: None,
                visibility: Some(visibility.to_string()),
            };
            assert!(validator.validate(&wishlist).is_valid);
        }
    }
}
