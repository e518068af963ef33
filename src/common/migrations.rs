// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing. Setting RESET_DB=true drops everything
/// first, which is only intended for local development.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("Dropped old tables");
    }

    create_user_tables(pool).await?;
    create_wishlist_tables(pool).await?;
    create_signin_token_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed successfully");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let tables = ["signin_tokens", "wishes", "wishlists", "users"];
    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            avatar TEXT,
            provider TEXT,
            provider_id TEXT,
            email_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_wishlist_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wishlists (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            visibility TEXT NOT NULL DEFAULT 'private',
            share_token TEXT UNIQUE,
            wish_count INTEGER NOT NULL DEFAULT 0,
            reserved_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (owner_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wishes (
            id TEXT PRIMARY KEY,
            wishlist_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            url TEXT,
            images TEXT,
            notes TEXT,
            price REAL,
            currency TEXT NOT NULL DEFAULT 'USD',
            status TEXT NOT NULL DEFAULT 'available',
            reserved_by TEXT,
            reserved_by_uid TEXT,
            reserved_at TEXT,
            reserver_name TEXT,
            reserved_message TEXT,
            purchased_by TEXT,
            purchased_at TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY (wishlist_id) REFERENCES wishlists(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_signin_token_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // One-time passwordless sign-in tokens. The pending reservation payload
    // (share_token + wish_id) rides along so the client can be re-prompted
    // after the emailed link is opened.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS signin_tokens (
            token TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            redirect_url TEXT NOT NULL,
            pending_share_token TEXT,
            pending_wish_id TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            expires_at TEXT NOT NULL,
            consumed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_wishlists_owner ON wishlists(owner_id)",
        "CREATE INDEX IF NOT EXISTS idx_wishlists_share_token ON wishlists(share_token)",
        "CREATE INDEX IF NOT EXISTS idx_wishes_wishlist ON wishes(wishlist_id)",
        "CREATE INDEX IF NOT EXISTS idx_wishes_status ON wishes(status)",
        "CREATE INDEX IF NOT EXISTS idx_users_provider ON users(provider, provider_id)",
        "CREATE INDEX IF NOT EXISTS idx_signin_tokens_email ON signin_tokens(email)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}
