use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::PersistedBooking;

/// Key of the single slot holding every cached booking.
pub const BOOKINGS_SLOT: &str = "bookings";

/// Durable client-side store of confirmed bookings. Writes are
/// load-all / modify / store-all and are not atomic across processes.
pub trait LocalCache: Send + Sync {
    fn load(&self) -> anyhow::Result<Vec<PersistedBooking>>;
    fn append(&self, booking: &PersistedBooking) -> anyhow::Result<()>;
    fn remove(&self, id: &str) -> anyhow::Result<bool>;
}

pub struct SqliteCache {
    db: Arc<Mutex<Connection>>,
}

impl SqliteCache {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn read_all(conn: &Connection) -> anyhow::Result<Vec<PersistedBooking>> {
        match queries::load_slot(conn, BOOKINGS_SLOT)? {
            Some(raw) => serde_json::from_str(&raw).context("corrupt bookings slot"),
            None => Ok(Vec::new()),
        }
    }

    fn write_all(conn: &Connection, bookings: &[PersistedBooking]) -> anyhow::Result<()> {
        let raw = serde_json::to_string(bookings)?;
        queries::store_slot(conn, BOOKINGS_SLOT, &raw)
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow::anyhow!("cache connection poisoned"))
    }
}

impl LocalCache for SqliteCache {
    fn load(&self) -> anyhow::Result<Vec<PersistedBooking>> {
        let conn = self.lock()?;
        Self::read_all(&conn)
    }

    fn append(&self, booking: &PersistedBooking) -> anyhow::Result<()> {
        let conn = self.lock()?;
        let mut all = Self::read_all(&conn)?;
        all.push(booking.clone());
        Self::write_all(&conn, &all)
    }

    fn remove(&self, id: &str) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let mut all = Self::read_all(&conn)?;
        let before = all.len();
        all.retain(|b| b.id != id);
        if all.len() == before {
            return Ok(false);
        }
        Self::write_all(&conn, &all)?;
        Ok(true)
    }
}

#[derive(Default)]
pub struct MemoryCache {
    bookings: Mutex<Vec<PersistedBooking>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn load(&self) -> anyhow::Result<Vec<PersistedBooking>> {
        let bookings = self
            .bookings
            .lock()
            .map_err(|_| anyhow::anyhow!("cache poisoned"))?;
        Ok(bookings.clone())
    }

    fn append(&self, booking: &PersistedBooking) -> anyhow::Result<()> {
        self.bookings
            .lock()
            .map_err(|_| anyhow::anyhow!("cache poisoned"))?
            .push(booking.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> anyhow::Result<bool> {
        let mut bookings = self
            .bookings
            .lock()
            .map_err(|_| anyhow::anyhow!("cache poisoned"))?;
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        Ok(bookings.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::{NaiveDate, Utc};

    fn booking(id: &str) -> PersistedBooking {
        PersistedBooking {
            id: id.to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+56911111111".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
            time: "10:00".to_string(),
            is_home_service: false,
            address: None,
            duration_minutes: Some(60),
            created_at: Utc::now(),
        }
    }

    fn sqlite_cache() -> SqliteCache {
        let conn = db::init_db(":memory:").unwrap();
        SqliteCache::new(Arc::new(Mutex::new(conn)))
    }

    fn exercise(cache: &dyn LocalCache) {
        assert!(cache.load().unwrap().is_empty());

        cache.append(&booking("a")).unwrap();
        cache.append(&booking("b")).unwrap();
        let ids: Vec<String> = cache.load().unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(cache.remove("a").unwrap());
        assert!(!cache.remove("a").unwrap());
        let ids: Vec<String> = cache.load().unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_sqlite_cache_append_and_remove() {
        exercise(&sqlite_cache());
    }

    #[test]
    fn test_memory_cache_append_and_remove() {
        exercise(&MemoryCache::new());
    }

    #[test]
    fn test_sqlite_cache_reads_legacy_slot() {
        let cache = sqlite_cache();
        {
            let conn = cache.db.lock().unwrap();
            queries::store_slot(
                &conn,
                BOOKINGS_SLOT,
                r#"[{"id":"old","name":"Ana","phone":"+569","date":"2025-06-16","time":"09:00","created_at":"2025-06-01T10:00:00Z"}]"#,
            )
            .unwrap();
        }
        let all = cache.load().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].effective_duration(), 60);
    }

    #[test]
    fn test_sqlite_cache_rejects_corrupt_slot() {
        let cache = sqlite_cache();
        {
            let conn = cache.db.lock().unwrap();
            queries::store_slot(&conn, BOOKINGS_SLOT, "not json").unwrap();
        }
        assert!(cache.load().is_err());
    }
}
