//! Key-value store.

use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use crate::error_handling::DatabaseError;

/// Rows per multi-row INSERT; 4 bound parameters each stays well under
/// SQLite's variable limit.
const INSERT_CHUNK_ROWS: usize = 500;

/// A value to be written, with optional JSON metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
    pub metadata: Option<Value>,
}

impl KvEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            metadata: None,
        }
    }

    /// Builds an entry whose value is `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self, DatabaseError> {
        let key = key.into();
        let value = serde_json::to_string(value).map_err(|source| DatabaseError::ValueError {
            key: key.clone(),
            source,
        })?;
        Ok(Self {
            key,
            value,
            metadata: None,
        })
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A listed key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// One page of a key listing, in ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPage {
    pub keys: Vec<KeyInfo>,
    /// Pass back to `list` to continue; `None` once the listing is complete
    pub cursor: Option<String>,
    pub list_complete: bool,
}

/// Key-value persistence used for the ZIP directory.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Reads several keys as one consistent snapshot. Absent keys are omitted.
    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, String>, DatabaseError>;

    async fn put(&self, entry: KvEntry) -> Result<(), DatabaseError>;

    /// Writes all entries atomically: readers see all of them or none.
    async fn put_batch(&self, entries: Vec<KvEntry>) -> Result<(), DatabaseError>;

    /// Replaces the whole contents of the store with `entries` atomically.
    /// Keys absent from `entries` are removed.
    async fn replace_all(&self, entries: Vec<KvEntry>) -> Result<(), DatabaseError>;

    /// Lists up to `limit` keys strictly after `cursor`.
    async fn list(&self, cursor: Option<&str>, limit: usize) -> Result<KeyPage, DatabaseError>;
}

/// Reads `key` and decodes it as JSON.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, DatabaseError> {
    match store.get(key).await? {
        Some(raw) => decode_json(key, &raw).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(raw).map_err(|source| DatabaseError::ValueError {
        key: key.to_string(),
        source,
    })
}

/// Walks every page of the listing and returns all keys not in `exclude`.
pub async fn list_all_keys(
    store: &dyn KvStore,
    page_limit: usize,
    exclude: &[&str],
) -> Result<Vec<KeyInfo>, DatabaseError> {
    let mut page = store.list(None, page_limit).await?;
    let mut keys = std::mem::take(&mut page.keys);
    while !page.list_complete {
        page = store.list(page.cursor.as_deref(), page_limit).await?;
        keys.append(&mut page.keys);
    }
    keys.retain(|k| !exclude.contains(&k.name.as_str()));
    Ok(keys)
}

/// [`KvStore`] backed by the `kv` table of a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wraps a pool whose migrations have already been applied.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn encode_metadata(entry: &KvEntry) -> Option<String> {
    entry.metadata.as_ref().map(Value::to_string)
}

fn decode_metadata(raw: Option<String>) -> Option<Value> {
    raw.and_then(|m| serde_json::from_str(&m).ok())
}

/// Upserts `entries` in multi-row statements on an open connection.
async fn upsert_entries(
    conn: &mut SqliteConnection,
    entries: &[KvEntry],
) -> Result<(), DatabaseError> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    for chunk in entries.chunks(INSERT_CHUNK_ROWS) {
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO kv (key, value, metadata, updated_at_ms) ");
        query_builder.push_values(chunk, |mut row, entry| {
            row.push_bind(entry.key.as_str())
                .push_bind(entry.value.as_str())
                .push_bind(encode_metadata(entry))
                .push_bind(now_ms);
        });
        query_builder.push(
            " ON CONFLICT(key) DO UPDATE SET
                 value=excluded.value,
                 metadata=excluded.metadata,
                 updated_at_ms=excluded.updated_at_ms",
        );
        query_builder.build().execute(&mut *conn).await?;
    }
    Ok(())
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, String>, DatabaseError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        // A single statement reads from a single snapshot of the database
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT key, value FROM kv WHERE key IN (");
        let mut separated = query_builder.separated(", ");
        for key in keys {
            separated.push_bind(*key);
        }
        separated.push_unseparated(")");

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.get("key"), row.get("value")))
            .collect())
    }

    async fn put(&self, entry: KvEntry) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO kv (key, value, metadata, updated_at_ms) VALUES (?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                 value=excluded.value,
                 metadata=excluded.metadata,
                 updated_at_ms=excluded.updated_at_ms",
        )
        .bind(entry.key.as_str())
        .bind(entry.value.as_str())
        .bind(encode_metadata(&entry))
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn put_batch(&self, entries: Vec<KvEntry>) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        upsert_entries(&mut tx, &entries).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_all(&self, entries: Vec<KvEntry>) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM kv").execute(&mut *tx).await?;
        upsert_entries(&mut tx, &entries).await?;
        tx.commit().await?;
        debug!(
            "Replaced {} stored keys with {} entries",
            removed.rows_affected(),
            entries.len()
        );
        Ok(())
    }

    async fn list(&self, cursor: Option<&str>, limit: usize) -> Result<KeyPage, DatabaseError> {
        let limit = limit.max(1);
        // Fetch one extra row to learn whether another page follows
        let fetch = i64::try_from(limit).unwrap_or(i64::MAX - 1) + 1;
        let rows = match cursor {
            Some(cursor) => {
                sqlx::query("SELECT key, metadata FROM kv WHERE key > ? ORDER BY key LIMIT ?")
                    .bind(cursor)
                    .bind(fetch)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT key, metadata FROM kv ORDER BY key LIMIT ?")
                    .bind(fetch)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let list_complete = rows.len() <= limit;
        let keys: Vec<KeyInfo> = rows
            .into_iter()
            .take(limit)
            .map(|row| KeyInfo {
                name: row.get("key"),
                metadata: decode_metadata(row.get("metadata")),
            })
            .collect();
        let cursor = if list_complete {
            None
        } else {
            keys.last().map(|k| k.name.clone())
        };

        Ok(KeyPage {
            keys,
            cursor,
            list_complete,
        })
    }
}
