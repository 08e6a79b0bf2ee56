// src/common/migrations.rs
//! Database schema management and demo data

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Owner of the seeded collections
pub const SEED_ADMIN_ID: &str = "U_000001";
pub const SEED_ADMIN_PROVIDER_ID: &str = "seed-admin";

/// Run all database migrations
///
/// Tables are created if missing. `RESET_DB=true` drops them first, which
/// only matters for file-backed databases.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("⚠️  RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("✅ Dropped old tables");
    }

    create_tables(pool).await?;
    create_indexes(pool).await?;

    info!("✅ Database migration completed successfully!");
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for table in ["payments", "collections", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            phone TEXT,
            role TEXT NOT NULL DEFAULT 'user',
            is_active INTEGER NOT NULL DEFAULT 1,
            provider TEXT NOT NULL,
            provider_id TEXT NOT NULL,
            avatar TEXT,
            created_at TEXT NOT NULL,
            last_login TEXT,
            UNIQUE (provider, provider_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            target_amount REAL,
            current_amount REAL NOT NULL DEFAULT 0,
            currency TEXT NOT NULL DEFAULT 'GHS',
            status TEXT NOT NULL DEFAULT 'active',
            is_public INTEGER NOT NULL DEFAULT 1,
            start_date TEXT,
            end_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            created_by TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reference TEXT NOT NULL UNIQUE,
            amount REAL NOT NULL,
            currency TEXT NOT NULL DEFAULT 'GHS',
            status TEXT NOT NULL DEFAULT 'pending',
            customer_email TEXT NOT NULL,
            customer_name TEXT NOT NULL,
            customer_phone TEXT,
            payment_method TEXT NOT NULL,
            mobile_money_provider TEXT,
            description TEXT,
            collection_id INTEGER REFERENCES collections(id) ON DELETE SET NULL,
            collection_title TEXT,
            created_at TEXT NOT NULL,
            processed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_collections_public ON collections(is_public, status)",
        "CREATE INDEX IF NOT EXISTS idx_collections_created_by ON collections(created_by)",
        "CREATE INDEX IF NOT EXISTS idx_payments_status ON payments(status)",
        "CREATE INDEX IF NOT EXISTS idx_payments_collection ON payments(collection_id)",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Insert the demo admin, collections and payments into an empty database
///
/// Returns false without touching anything when collections already exist.
pub async fn seed_demo_data(pool: &SqlitePool, admin_email: &str) -> Result<bool, sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collections")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!(collections = existing, "Skipping demo seed, collections already present");
        return Ok(false);
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users
            (id, email, full_name, role, is_active, provider, provider_id, created_at)
        VALUES (?, ?, 'AgaPay Admin', 'admin', 1, 'google', ?, '2024-01-01T00:00:00Z')
        "#,
    )
    .bind(SEED_ADMIN_ID)
    .bind(admin_email.to_lowercase())
    .bind(SEED_ADMIN_PROVIDER_ID)
    .execute(&mut *tx)
    .await?;

    let collections = [
        (
            "School Fees Contribution",
            "Contribution for student school fees for the academic year",
            5000.0,
            1250.0,
            "2024-01-01",
            "2024-12-31",
            "2024-01-01T00:00:00Z",
        ),
        (
            "Church Building Fund",
            "Fundraising for new church construction",
            10000.0,
            3500.0,
            "2024-01-15",
            "2024-12-15",
            "2024-01-15T00:00:00Z",
        ),
        (
            "Medical Emergency Fund",
            "Emergency medical fund for community members",
            2000.0,
            800.0,
            "2024-02-01",
            "2024-11-30",
            "2024-02-01T00:00:00Z",
        ),
    ];

    for (title, description, target, current, start, end, created_at) in collections {
        sqlx::query(
            r#"
            INSERT INTO collections
                (title, description, target_amount, current_amount, currency, status,
                 is_public, start_date, end_date, created_at, created_by)
            VALUES (?, ?, ?, ?, 'GHS', 'active', 1, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(target)
        .bind(current)
        .bind(start)
        .bind(end)
        .bind(created_at)
        .bind(SEED_ADMIN_ID)
        .execute(&mut *tx)
        .await?;
    }

    let payments = [
        (
            "AGA_SEED000000000001",
            100.0,
            "user1@example.com",
            "John Doe",
            1_i64,
            "School Fees Contribution",
            "2024-01-15T10:30:00Z",
            "2024-01-15T10:35:00Z",
        ),
        (
            "AGA_SEED000000000002",
            50.0,
            "user2@example.com",
            "Jane Smith",
            2_i64,
            "Church Building Fund",
            "2024-01-16T14:20:00Z",
            "2024-01-16T14:25:00Z",
        ),
    ];

    for (reference, amount, email, name, collection_id, title, created_at, processed_at) in
        payments
    {
        sqlx::query(
            r#"
            INSERT INTO payments
                (reference, amount, currency, status, customer_email, customer_name,
                 payment_method, collection_id, collection_title, created_at, processed_at)
            VALUES (?, ?, 'GHS', 'success', ?, ?, 'mobile_money', ?, ?, ?, ?)
            "#,
        )
        .bind(reference)
        .bind(amount)
        .bind(email)
        .bind(name)
        .bind(collection_id)
        .bind(title)
        .bind(created_at)
        .bind(processed_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!("🌱 Seeded demo collections and payments");
    Ok(true)
}
