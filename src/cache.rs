use crate::error::{CountError, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub const SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_CACHE_DIR: &str = ".count-changes";
pub const CACHE_FILE_NAME: &str = "cache.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub value: String,
    pub stored_at: DateTime<Utc>,
}

pub trait CacheStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>>;
    fn save(&mut self, key: &str, entry: &CacheEntry) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, CacheEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.entries.insert(key.to_string(), entry.clone());
        Ok(())
    }
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store inside `cache_dir`, or `./.count-changes` if `None`.
    pub fn open<P: AsRef<Path>>(cache_dir: Option<P>) -> Result<Self> {
        let cache_dir = match cache_dir {
            Some(path) => path.as_ref().to_path_buf(),
            None => std::env::current_dir()?.join(DEFAULT_CACHE_DIR),
        };
        std::fs::create_dir_all(&cache_dir)?;
        let db_path = cache_dir.join(CACHE_FILE_NAME);
        let conn = Connection::open(&db_path)?;
        let mut store = Self { conn };
        store.initialize()?;
        debug!(path = %db_path.display(), "opened cache database");
        Ok(store)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                stored_at INTEGER NOT NULL
            );
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(CountError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }
}

impl CacheStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let result = self.conn.query_row(
            "SELECT value, stored_at FROM entries WHERE key = ?",
            params![key],
            |row| {
                let ts: i64 = row.get(1)?;
                let stored_at = Utc.timestamp_opt(ts, 0).single().ok_or_else(|| {
                    rusqlite::Error::InvalidColumnType(
                        1,
                        "stored_at".to_string(),
                        rusqlite::types::Type::Integer,
                    )
                })?;
                Ok(CacheEntry {
                    value: row.get(0)?,
                    stored_at,
                })
            },
        );
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO entries (key, value, stored_at) VALUES (?, ?, ?)",
            params![key, entry.value, entry.stored_at.timestamp()],
        )?;
        Ok(())
    }
}

/// Time-expiring memoization over a [`CacheStore`].
pub struct Cache<S> {
    store: S,
    ttl: Duration,
}

impl<S: CacheStore> Cache<S> {
    pub fn new(store: S, ttl: std::time::Duration) -> Result<Self> {
        let ttl = Duration::from_std(ttl)
            .map_err(|e| CountError::Cache(format!("Invalid expiration time: {e}")))?;
        Ok(Self { store, ttl })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Return the fresh cached value for `key`, or run `compute` and store its result.
    ///
    /// A failing `compute` leaves the store untouched.
    pub fn get_or_compute<T, F>(&mut self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        let now = Utc::now();
        if let Some(entry) = self.store.load(key)? {
            if now - entry.stored_at < self.ttl {
                match serde_json::from_str(&entry.value) {
                    Ok(value) => {
                        debug!(key, "cache hit");
                        return Ok(value);
                    }
                    Err(e) => warn!(key, error = %e, "discarding undecodable cache entry"),
                }
            } else {
                debug!(key, stored_at = %entry.stored_at, "cache entry expired");
            }
        } else {
            debug!(key, "cache miss");
        }

        let value = compute()?;
        let entry = CacheEntry {
            value: serde_json::to_string(&value)?,
            stored_at: now,
        };
        self.store.save(key, &entry)?;
        Ok(value)
    }
}
