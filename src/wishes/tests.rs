//! Tests for wishes module
//!
//! Model/validator coverage plus database-level checks of the conflict
//! backstop: the conditional single-row UPDATE that lets exactly one
//! reserve call win a race.

#[cfg(test)]
mod tests {
    use super::super::*;
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
        sqlx::query(
            "INSERT INTO wishlists (id, owner_id, name, visibility, share_token, wish_count) VALUES ('L_TEST01', 'U_OWNER1', 'Birthday', 'public', 'SHARETOKEN123456', 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO wishes (id, wishlist_id, title, price, currency) VALUES ('W_TEST01', 'L_TEST01', 'Nike Air Max 90', 120.0, 'USD')",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    /// The reserve handler's conditional UPDATE, verbatim
    async fn try_reserve(pool: &SqlitePool, wish_id: &str, email: &str, uid: &str) -> u64 {
        sqlx::query(
            r#"
            UPDATE wishes SET
                status = 'reserved',
                reserved_by = ?,
                reserved_by_uid = ?,
                reserved_at = datetime('now'),
                updated_at = datetime('now')
            WHERE id = ? AND status = 'available'
            "#,
        )
        .bind(email)
        .bind(uid)
        .bind(wish_id)
        .execute(pool)
        .await
        .unwrap()
        .rows_affected()
    }

    #[tokio::test]
    async fn test_concurrent_reserve_exactly_one_winner() {
        let pool = setup_test_db().await;

        // Two callers race for the same available wish
        let first = try_reserve(&pool, "W_TEST01", "a@example.com", "U_A").await;
        let second = try_reserve(&pool, "W_TEST01", "b@example.com", "U_B").await;

        assert_eq!(first, 1, "first caller wins");
        assert_eq!(second, 0, "second caller loses the race");

        let (status, reserved_by): (String, Option<String>) =
            sqlx::query_as("SELECT status, reserved_by FROM wishes WHERE id = 'W_TEST01'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "reserved");
        assert_eq!(reserved_by.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn test_reserved_count_never_drops_below_zero() {
        let pool = setup_test_db().await;

        // A stale cancel against a list whose counter is already zero
        sqlx::query(
            "UPDATE wishlists SET reserved_count = MAX(reserved_count - 1, 0) WHERE id = 'L_TEST01'",
        )
        .execute(&pool)
        .await
        .unwrap();

        let (count,): (i64,) =
            sqlx::query_as("SELECT reserved_count FROM wishlists WHERE id = 'L_TEST01'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_cancel_conditional_update_requires_reserved() {
        let pool = setup_test_db().await;

        let rows = sqlx::query(
            "UPDATE wishes SET status = 'available', reserved_by = NULL WHERE id = 'W_TEST01' AND status = 'reserved'",
        )
        .execute(&pool)
        .await
        .unwrap()
        .rows_affected();

        assert_eq!(rows, 0, "cancel must not touch an available wish");
    }

    #[tokio::test]
    async fn test_wish_row_roundtrip_and_status_normalization() {
        let pool = setup_test_db().await;

        let wish = sqlx::query_as::<_, models::Wish>("SELECT * FROM wishes WHERE id = 'W_TEST01'")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(wish.title, "Nike Air Max 90");
        assert_eq!(wish.status(), reservation::WishStatus::Available);
        assert_eq!(wish.currency, "USD");
        assert!(reservation::invariant_holds(&wish));
    }

    #[test]
    fn test_public_wish_response_hides_reserver_email() {
        let wish = models::Wish {
            id: "W_TEST02".to_string(),
            wishlist_id: "L_TEST01".to_string(),
            title: "Lego set".to_string(),
            description: None,
            url: None,
            images: Some(r#"["https://cdn.example.com/lego.jpg"]"#.to_string()),
            notes: None,
            price: Some(59.99),
            currency: "USD".to_string(),
            status: "reserved".to_string(),
            reserved_by: Some("friend@example.com".to_string()),
            reserved_by_uid: Some("U_FRIEND".to_string()),
            reserved_at: Some("2024-06-01 12:00:00".to_string()),
            reserver_name: Some("Friend".to_string()),
            reserved_message: Some("shh".to_string()),
            purchased_by: None,
            purchased_at: None,
            created_at: None,
            updated_at: None,
        };

        let public: models::PublicWishResponse = wish.into();
        let json = serde_json::to_value(&public).unwrap();

        assert_eq!(json["status"], "reserved");
        assert_eq!(json["reserver_name"], "Friend");
        assert_eq!(json["images"][0], "https://cdn.example.com/lego.jpg");
        assert!(json.get("reserved_by").is_none());
        assert!(json.get("reserved_by_uid").is_none());
        assert!(json.get("reserved_message").is_none());
    }
}
