use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Mutex;

/// Globally scoped key-value persistence for serialized UI state.
///
/// Values survive across sessions and are not tied to a workspace.
#[async_trait]
pub trait StateBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    /// Replaces the value under `key` in a single write.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct StoredState {
    pub key: String,
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SqliteStateStore {
    pool: Pool<Sqlite>,
}

impl SqliteStateStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open state database '{database_url}'"))?;
        let store = Self { pool };
        store.ensure_state_table().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_state_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS composite_state (
                storage_key TEXT PRIMARY KEY NOT NULL,
                payload     TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure composite_state table exists")?;
        Ok(())
    }

    pub async fn load_entry(&self, key: &str) -> Result<Option<StoredState>> {
        let row = sqlx::query(
            "SELECT storage_key, payload, updated_at FROM composite_state WHERE storage_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to read state for key '{key}'"))?;

        row.map(|row| {
            Ok(StoredState {
                key: row.try_get("storage_key")?,
                payload: row.try_get("payload")?,
                updated_at: row.try_get("updated_at")?,
            })
        })
        .transpose()
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM composite_state WHERE storage_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete state for key '{key}'"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl StateBackend for SqliteStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_entry(key).await?.map(|entry| entry.payload))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO composite_state (storage_key, payload, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(storage_key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write state for key '{key}'"))?;
        tracing::debug!(storage_key = key, bytes = value.len(), "persisted state");
        Ok(())
    }
}

/// Process-local backend; nothing outlives the value.
#[derive(Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries: Mutex::new(entries),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `set` calls observed so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateBackend for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
