//! SQLite implementation of the UserStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Params};

use osulink_core::{
    CommandEnum, DiscordIntegration, DiscordUserId, OsuIntegration, OsuUserId, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{IdentityQuery, UserStore};

const USER_COLUMNS: &str = "user_id, discord_user_id, discord_username, discord_access_token, \
     discord_refresh_token, osu_user_id, osu_username, osu_playmode, osu_access_token, \
     osu_refresh_token, osu_last_verified, last_login";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and its parent directory) and runs migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened user database");
        Self::from_connection(conn)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

/// A user row before its grants are attached.
struct UserRow {
    id: UserId,
    discord: Option<DiscordIntegration>,
    osu: Option<OsuIntegration>,
    last_login: Option<i64>,
}

impl UserRow {
    fn into_user(self, permissions: Vec<CommandEnum>) -> User {
        User::from_parts(self.id, self.discord, self.osu, self.last_login, permissions)
    }
}

fn row_to_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id: [u8; 12] = id_bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "user_id".into(), rusqlite::types::Type::Blob)
    })?;

    let discord = match row.get::<_, Option<String>>(1)? {
        Some(discord_id) => Some(DiscordIntegration {
            user_id: DiscordUserId::new(discord_id),
            username_with_discriminator: row.get(2)?,
            access_token: row.get(3)?,
            refresh_token: row.get(4)?,
        }),
        None => None,
    };

    let osu = match row.get::<_, Option<i64>>(5)? {
        Some(osu_id) => Some(OsuIntegration {
            user_id: OsuUserId(osu_id as u64),
            username: row.get(6)?,
            playmode: row.get(7)?,
            access_token: row.get(8)?,
            refresh_token: row.get(9)?,
            last_verified: row.get(10)?,
        }),
        None => None,
    };

    Ok(UserRow {
        id: UserId::from_bytes(id),
        discord,
        osu,
        last_login: row.get(11)?,
    })
}

fn load_permissions(conn: &Connection, id: &UserId) -> Result<Vec<CommandEnum>> {
    let mut stmt = conn.prepare(
        "SELECT command_enum FROM user_permissions WHERE user_id = ?1 ORDER BY position",
    )?;
    let permissions = stmt
        .query_map(params![id.as_bytes().as_slice()], |row| {
            row.get::<_, String>(0).map(CommandEnum::new)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(permissions)
}

fn query_users<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, row_to_user_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|row| {
            let permissions = load_permissions(conn, &row.id)?;
            Ok(row.into_user(permissions))
        })
        .collect()
}

fn query_user<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Option<User>> {
    let row = conn.query_row(sql, params, row_to_user_row).optional()?;
    match row {
        Some(row) => {
            let permissions = load_permissions(conn, &row.id)?;
            Ok(Some(row.into_user(permissions)))
        }
        None => Ok(None),
    }
}

fn write_user(conn: &mut Connection, user: &User) -> Result<()> {
    let tx = conn.transaction()?;
    let id = user.id.as_bytes().as_slice();
    let discord = user.discord.as_ref();
    let osu = user.osu.as_ref();

    tx.execute(
        "INSERT INTO users (
            user_id, discord_user_id, discord_username, discord_access_token,
            discord_refresh_token, osu_user_id, osu_username, osu_playmode,
            osu_access_token, osu_refresh_token, osu_last_verified, last_login, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        ON CONFLICT(user_id) DO UPDATE SET
            discord_user_id = excluded.discord_user_id,
            discord_username = excluded.discord_username,
            discord_access_token = excluded.discord_access_token,
            discord_refresh_token = excluded.discord_refresh_token,
            osu_user_id = excluded.osu_user_id,
            osu_username = excluded.osu_username,
            osu_playmode = excluded.osu_playmode,
            osu_access_token = excluded.osu_access_token,
            osu_refresh_token = excluded.osu_refresh_token,
            osu_last_verified = excluded.osu_last_verified,
            last_login = excluded.last_login,
            updated_at = excluded.updated_at",
        params![
            id,
            discord.map(|d| d.user_id.as_str()),
            discord.and_then(|d| d.username_with_discriminator.as_deref()),
            discord.and_then(|d| d.access_token.as_deref()),
            discord.and_then(|d| d.refresh_token.as_deref()),
            osu.map(|o| o.user_id.0 as i64),
            osu.and_then(|o| o.username.as_deref()),
            osu.and_then(|o| o.playmode.as_deref()),
            osu.and_then(|o| o.access_token.as_deref()),
            osu.and_then(|o| o.refresh_token.as_deref()),
            osu.and_then(|o| o.last_verified),
            user.last_login,
            osulink_core::now_millis(),
        ],
    )?;

    tx.execute("DELETE FROM user_permissions WHERE user_id = ?1", params![id])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO user_permissions (user_id, position, command_enum) VALUES (?1, ?2, ?3)",
        )?;
        for (position, command_enum) in user.permissions().iter().enumerate() {
            stmt.execute(params![id, position as i64, command_enum.as_str()])?;
        }
    }

    tx.commit()?;
    Ok(())
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let id = *id;
        self.run_blocking(move |conn| {
            query_user(
                conn,
                &format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS),
                params![id.as_bytes().as_slice()],
            )
        })
        .await
    }

    async fn find_by_grant(&self, command_enum: &CommandEnum) -> Result<Vec<User>> {
        let command_enum = command_enum.clone();
        self.run_blocking(move |conn| {
            query_users(
                conn,
                &format!(
                    "SELECT {} FROM users
                     WHERE user_id IN (SELECT user_id FROM user_permissions WHERE command_enum = ?1)
                     ORDER BY rowid",
                    USER_COLUMNS
                ),
                params![command_enum.as_str()],
            )
        })
        .await
    }

    async fn find_by_identity(&self, query: &IdentityQuery) -> Result<Option<User>> {
        let query = query.clone();
        self.run_blocking(move |conn| {
            let (column, value): (&str, rusqlite::types::Value) = match &query {
                IdentityQuery::DiscordId(id) => ("discord_user_id", id.as_str().to_string().into()),
                IdentityQuery::OsuId(id) => ("osu_user_id", (id.0 as i64).into()),
                IdentityQuery::OsuUsername(name) => ("osu_username", name.clone().into()),
            };
            query_user(
                conn,
                &format!(
                    "SELECT {} FROM users WHERE {} = ?1 ORDER BY rowid LIMIT 1",
                    USER_COLUMNS, column
                ),
                params![value],
            )
        })
        .await
    }

    async fn persist(&self, user: &User) -> Result<()> {
        let user = user.clone();
        self.run_blocking(move |conn| {
            write_user(conn, &user)?;
            tracing::debug!(user = %user.id, grants = user.permissions().len(), "persisted user");
            Ok(())
        })
        .await
    }

    async fn count_users(&self) -> Result<usize> {
        self.run_blocking(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}
