//! Database module for SQLite persistence using SeaORM

pub mod entities;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::path::Path;

/// Initialize database connection and create tables
pub async fn init_database(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    tracing::info!("Connecting to database: {}", db_url);

    let db = Database::connect(&db_url).await?;

    // Create tables
    create_tables(&db).await?;

    Ok(db)
}

/// Create all tables if they don't exist
async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Dhams table (root level)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS dhams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            short_description TEXT,
            full_content TEXT,
            state TEXT,
            city TEXT,
            country TEXT NOT NULL DEFAULT 'India',
            latitude REAL,
            longitude REAL,
            featured_image TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            is_featured INTEGER NOT NULL DEFAULT 0,
            dham_code TEXT UNIQUE,
            hierarchy_id TEXT UNIQUE,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#.to_string(),
    )).await?;

    // Key Spot categories
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS spot_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            icon TEXT NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0
        )
        "#.to_string(),
    )).await?;

    // Sub-Spot categories
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS sub_spot_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            icon TEXT NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0
        )
        "#.to_string(),
    )).await?;

    // Key Places table (level 2)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS key_places (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dham_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            short_description TEXT,
            featured_image TEXT,
            latitude REAL,
            longitude REAL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_visible INTEGER NOT NULL DEFAULT 1,
            hierarchy_id TEXT UNIQUE,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (dham_id) REFERENCES dhams(id) ON DELETE CASCADE
        )
        "#.to_string(),
    )).await?;

    // Create index for parent lookups
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_key_places_dham ON key_places(dham_id)"#.to_string(),
    )).await?;

    // Key Spots table (level 3)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS key_spots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key_place_id INTEGER NOT NULL,
            category_id INTEGER,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            short_description TEXT,
            featured_image TEXT,
            latitude REAL,
            longitude REAL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_visible INTEGER NOT NULL DEFAULT 1,
            hierarchy_id TEXT UNIQUE,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (key_place_id) REFERENCES key_places(id) ON DELETE CASCADE,
            FOREIGN KEY (category_id) REFERENCES spot_categories(id) ON DELETE SET NULL
        )
        "#.to_string(),
    )).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_key_spots_place ON key_spots(key_place_id)"#.to_string(),
    )).await?;

    // Sub-Spots table (level 4)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS sub_spots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            key_spot_id INTEGER NOT NULL,
            category_id INTEGER,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            short_description TEXT,
            featured_image TEXT,
            latitude REAL,
            longitude REAL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_visible INTEGER NOT NULL DEFAULT 1,
            hierarchy_id TEXT UNIQUE,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (key_spot_id) REFERENCES key_spots(id) ON DELETE CASCADE,
            FOREIGN KEY (category_id) REFERENCES sub_spot_categories(id) ON DELETE SET NULL
        )
        "#.to_string(),
    )).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_sub_spots_spot ON sub_spots(key_spot_id)"#.to_string(),
    )).await?;

    // Migration: add dham_code / hierarchy_id columns for databases that
    // predate the hierarchy-ID scheme. Best-effort: fails harmlessly when
    // the column already exists. SQLite cannot add a UNIQUE column in
    // ALTER TABLE, so uniqueness comes from separate indexes.
    let _ = db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"ALTER TABLE dhams ADD COLUMN dham_code TEXT"#.to_string(),
    )).await;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_dhams_code ON dhams(dham_code)"#.to_string(),
    )).await?;
    for table in ["dhams", "key_places", "key_spots", "sub_spots"] {
        let _ = db.execute(Statement::from_string(
            db.get_database_backend(),
            format!("ALTER TABLE {table} ADD COLUMN hierarchy_id TEXT"),
        )).await;
        db.execute(Statement::from_string(
            db.get_database_backend(),
            format!("CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_hierarchy ON {table}(hierarchy_id)"),
        )).await?;
    }

    tracing::info!("Database tables initialized");
    Ok(())
}

/// In-memory database for tests. A single pooled connection, since every
/// `sqlite::memory:` connection is its own database. Foreign keys are left
/// unenforced so tests can model historical data with dangling references.
#[cfg(test)]
pub(crate) async fn init_test_database() -> DatabaseConnection {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await
    .expect("Failed to disable foreign keys");
    create_tables(&db).await.expect("Failed to create tables");
    db
}

/// Current unix timestamp in seconds, used for created_at/updated_at columns.
pub fn now_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
