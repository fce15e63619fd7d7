//! SQLite Database
//!
//! Embedded database for persistent storage using rusqlite with r2d2 connection pooling.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::services::icp::IcpRow;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::database_path;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create an in-memory database for testing.
    ///
    /// Uses an in-memory SQLite database with the same schema as the
    /// production database. Useful for integration and unit tests.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Create a new database instance with connection pooling
    pub fn new() -> AppResult<Self> {
        let db_path = database_path()?;

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;

        tracing::debug!("[Database] opened {}", db_path.display());
        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        // Key-value settings (also holds the persisted task list)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        // ICP rows, same columns as the remote table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS icps (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                custom_parameters TEXT NOT NULL DEFAULT '[]',
                color TEXT,
                assistant_id TEXT,
                system_prompt TEXT,
                user_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                date_modified TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_icps_user_created ON icps(user_id, created_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }

    // ========================================================================
    // Settings Operations
    // ========================================================================

    /// Get a setting value
    pub fn get_setting(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.get_connection()?;
        let result = conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// Set a setting value
    pub fn set_setting(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a setting
    pub fn delete_setting(&self, key: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ========================================================================
    // ICP Operations
    // ========================================================================

    /// Insert a new ICP row
    pub fn insert_icp(&self, row: &IcpRow) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO icps (id, name, description, custom_parameters, color, assistant_id,
                               system_prompt, user_id, created_at, updated_at, date_modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                row.id,
                row.name,
                row.description,
                row.custom_parameters_text(),
                row.color,
                row.assistant_id,
                row.system_prompt,
                row.user_id,
                row.created_at,
                row.updated_at,
                row.date_modified,
            ],
        )?;
        Ok(())
    }

    /// Get an ICP row by id
    pub fn get_icp(&self, id: &str) -> AppResult<Option<IcpRow>> {
        let conn = self.get_connection()?;
        let result = conn.query_row(
            "SELECT id, name, description, custom_parameters, color, assistant_id,
                    system_prompt, user_id, created_at, updated_at, date_modified
             FROM icps WHERE id = ?1",
            params![id],
            row_to_icp,
        );

        match result {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// List an owner's ICP rows, newest first
    pub fn list_icps(&self, user_id: &str) -> AppResult<Vec<IcpRow>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, custom_parameters, color, assistant_id,
                    system_prompt, user_id, created_at, updated_at, date_modified
             FROM icps WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], row_to_icp)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Overwrite every mutable column of an ICP row; false if the id is unknown
    pub fn update_icp(&self, row: &IcpRow) -> AppResult<bool> {
        let conn = self.get_connection()?;
        let changed = conn.execute(
            "UPDATE icps SET name = ?2, description = ?3, custom_parameters = ?4, color = ?5,
                    assistant_id = ?6, system_prompt = ?7, updated_at = ?8, date_modified = ?9
             WHERE id = ?1",
            params![
                row.id,
                row.name,
                row.description,
                row.custom_parameters_text(),
                row.color,
                row.assistant_id,
                row.system_prompt,
                row.updated_at,
                row.date_modified,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete an ICP row; false if there was nothing to delete
    pub fn delete_icp(&self, id: &str) -> AppResult<bool> {
        let conn = self.get_connection()?;
        let changed = conn.execute("DELETE FROM icps WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

/// Map a `SELECT id, name, ... date_modified` row
fn row_to_icp(row: &rusqlite::Row) -> rusqlite::Result<IcpRow> {
    let custom_parameters: String = row.get(3)?;
    Ok(IcpRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        custom_parameters: serde_json::Value::String(custom_parameters),
        color: row.get(4)?,
        assistant_id: row.get(5)?,
        system_prompt: row.get(6)?,
        user_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        date_modified: row.get(10)?,
    })
}
