//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, osulink_core::now_millis()],
            )?;
            tracing::info!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per user; identity columns are NULL until linked
        CREATE TABLE users (
            user_id BLOB PRIMARY KEY,          -- 12 bytes
            discord_user_id TEXT UNIQUE,
            discord_username TEXT,             -- username#discriminator
            discord_access_token TEXT,
            discord_refresh_token TEXT,
            osu_user_id INTEGER UNIQUE,
            osu_username TEXT,
            osu_playmode TEXT,
            osu_access_token TEXT,
            osu_refresh_token TEXT,
            osu_last_verified INTEGER,         -- Unix ms
            last_login INTEGER,                -- Unix ms
            updated_at INTEGER NOT NULL
        );

        -- Permission grants; position keeps grant order
        CREATE TABLE user_permissions (
            user_id BLOB NOT NULL REFERENCES users(user_id),
            position INTEGER NOT NULL,
            command_enum TEXT NOT NULL,
            PRIMARY KEY (user_id, command_enum)
        );

        CREATE INDEX idx_user_permissions_enum ON user_permissions(command_enum);
        CREATE INDEX idx_users_osu_username ON users(osu_username);
        "#,
    )?;

    Ok(())
}
