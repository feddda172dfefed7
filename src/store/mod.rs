//! Named record persistence
//!
//! Watch history, settings and the provider choice are each one JSON record
//! in a small SQLite table, read and written whole by key.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::app_dir;
use crate::error::Result;

/// Get the database file path (~/.config/ratflix/ratflix.db)
pub fn db_path() -> PathBuf {
    app_dir().join("ratflix.db")
}

/// Key/value store of JSON records
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the store at the default location
    pub fn open() -> Result<Self> {
        Self::open_at(&db_path())
    }

    /// Open or create the store at `path`
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init_schema()?;
        tracing::debug!("Opened record store at {}", path.display());

        Ok(store)
    }

    /// Non-persistent store, used by tests and `--ephemeral` runs
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;
        Ok(())
    }

    /// Raw JSON text of a record
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Decode a record; a missing record is `None`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Replace a record with the JSON encoding of `value`
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = datetime('now')",
            params![key, json],
        )?;
        Ok(())
    }

    /// Delete a record; deleting a missing record is fine
    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM records WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_put_get_remove() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.get::<u32>("provider_index").unwrap(), None);

        store.put("provider_index", &3u32).unwrap();
        assert_eq!(store.get::<u32>("provider_index").unwrap(), Some(3));

        store.put("provider_index", &5u32).unwrap();
        assert_eq!(store.get::<u32>("provider_index").unwrap(), Some(5));

        store.remove("provider_index").unwrap();
        assert_eq!(store.get::<u32>("provider_index").unwrap(), None);
        store.remove("provider_index").unwrap();
    }

    #[test]
    fn test_records_are_independent() {
        let store = Store::open_in_memory().unwrap();
        let mut map = BTreeMap::new();
        map.insert("title-text".to_string(), "ratflix".to_string());

        store.put("settings", &map).unwrap();
        store.put("watch_history", &Vec::<u32>::new()).unwrap();

        let loaded: BTreeMap<String, String> = store.get("settings").unwrap().unwrap();
        assert_eq!(loaded, map);
        assert_eq!(store.get_raw("watch_history").unwrap().unwrap(), "[]");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratflix.db");

        {
            let store = Store::open_at(&path).unwrap();
            store.put("provider_index", &2u32).unwrap();
        }

        let store = Store::open_at(&path).unwrap();
        assert_eq!(store.get::<u32>("provider_index").unwrap(), Some(2));
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let store = Store::open_in_memory().unwrap();
        store.put("settings", "not a map").unwrap();
        assert!(store.get::<BTreeMap<String, String>>("settings").is_err());
    }
}
