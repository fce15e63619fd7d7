//! ICP Row Stores
//!
//! Row-level persistence behind `IcpService`. The local SQLite table is the
//! default; `SupabaseIcpStore` talks to the hosted table.

use async_trait::async_trait;

use super::row::IcpRow;
use crate::storage::database::Database;
use crate::utils::error::{AppError, AppResult};

/// Row-level CRUD over the `icps` table
#[async_trait]
pub trait IcpRowStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Rows owned by `user_id`, newest first
    async fn list(&self, user_id: &str) -> AppResult<Vec<IcpRow>>;

    /// `Ok(None)` when no row has this id
    async fn get(&self, id: &str) -> AppResult<Option<IcpRow>>;

    /// Insert and return the stored row
    async fn insert(&self, row: IcpRow) -> AppResult<IcpRow>;

    /// Overwrite a row; `Ok(None)` when no row has this id
    async fn update(&self, row: IcpRow) -> AppResult<Option<IcpRow>>;

    /// Returns whether a row existed and was removed
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// `icps` table in the application database
pub struct SqliteIcpStore {
    db: Database,
}

impl SqliteIcpStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run a blocking database call off the async runtime
    async fn blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> AppResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| AppError::database(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl IcpRowStore for SqliteIcpStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self, user_id: &str) -> AppResult<Vec<IcpRow>> {
        let user_id = user_id.to_string();
        self.blocking(move |db| db.list_icps(&user_id)).await
    }

    async fn get(&self, id: &str) -> AppResult<Option<IcpRow>> {
        let id = id.to_string();
        self.blocking(move |db| db.get_icp(&id)).await
    }

    async fn insert(&self, row: IcpRow) -> AppResult<IcpRow> {
        self.blocking(move |db| {
            db.insert_icp(&row)?;
            db.get_icp(&row.id)?
                .ok_or_else(|| AppError::database(format!("ICP {} vanished after insert", row.id)))
        })
        .await
    }

    async fn update(&self, row: IcpRow) -> AppResult<Option<IcpRow>> {
        self.blocking(move |db| {
            if !db.update_icp(&row)? {
                return Ok(None);
            }
            db.get_icp(&row.id)
        })
        .await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let id = id.to_string();
        self.blocking(move |db| db.delete_icp(&id)).await
    }
}
