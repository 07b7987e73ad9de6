//! SQLite-based metadata cache.
//!
//! Keeps results that are expensive to recompute across runs, chiefly the
//! language-model table descriptions. The cache is stored in
//! `~/.keyscout/cache.db` unless configured otherwise.
//!
//! # Design
//!
//! - Simple key-value store with JSON values
//! - No TTL - entries persist until cleared
//! - Versioned - auto-clears on version mismatch
//!
//! # Key Format
//!
//! ```text
//! {conn_hash}:description:{table}   -> String
//! ```

mod hash;
pub use hash::connection_hash;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

/// Current cache schema version. Bump this when the cache format changes.
const CACHE_VERSION: i32 = 1;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to determine cache directory")]
    NoCacheDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// SQLite-based key/value cache.
pub struct MetadataCache {
    conn: Connection,
}

impl MetadataCache {
    /// Open or create the cache at `path`, or at the default location.
    ///
    /// If the stored version doesn't match, the cache is cleared.
    pub fn open(path: Option<&Path>) -> CacheResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let cache = Self {
            conn: Connection::open(&path)?,
        };
        cache.init()?;
        debug!(path = %path.display(), "opened cache");
        Ok(cache)
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> CacheResult<Self> {
        let cache = Self {
            conn: Connection::open_in_memory()?,
        };
        cache.init()?;
        Ok(cache)
    }

    /// `~/.keyscout/cache.db`.
    pub fn default_path() -> CacheResult<PathBuf> {
        let base = dirs::home_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(base.join(".keyscout").join("cache.db"))
    }

    fn init(&self) -> CacheResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == CACHE_VERSION => {}
            Some(old) => {
                debug!(old, new = CACHE_VERSION, "cache version changed, clearing");
                self.clear_all()?;
                self.set_version()?;
            }
            None => self.set_version()?,
        }

        Ok(())
    }

    fn set_version(&self) -> CacheResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![CACHE_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Get a value from the cache.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(CacheError::from)
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> CacheResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO cache (key, value) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }

    /// Delete all entries matching a key prefix.
    pub fn delete_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let pattern = format!("{}%", prefix);
        let rows = self
            .conn
            .execute("DELETE FROM cache WHERE key LIKE ?", params![pattern])?;
        Ok(rows)
    }

    /// Clear all cache entries (but keep metadata).
    pub fn clear_all(&self) -> CacheResult<()> {
        self.conn.execute("DELETE FROM cache", [])?;
        Ok(())
    }

    /// Clear cache entries for one connection.
    pub fn clear_connection(&self, conn_hash: &str) -> CacheResult<usize> {
        self.delete_prefix(&format!("{}:", conn_hash))
    }

    /// Number of stored entries.
    pub fn len(&self) -> CacheResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    pub fn description_key(conn_hash: &str, table: &str) -> String {
        format!("{}:description:{}", conn_hash, table)
    }

    pub fn get_description(&self, conn_hash: &str, table: &str) -> CacheResult<Option<String>> {
        self.get(&Self::description_key(conn_hash, table))
    }

    pub fn set_description(&self, conn_hash: &str, table: &str, text: &str) -> CacheResult<()> {
        self.set(&Self::description_key(conn_hash, table), &text)
    }
}
