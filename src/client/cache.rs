//! In-memory cache for raw API responses
//!
//! Keys are `{kind}_{identifier}` compound strings. Entries carry their
//! creation time and expire lazily: a `get` past the configured duration
//! deletes the entry and reports absence. No size bound and no background
//! sweep; unbounded growth is accepted for the lifetime of one process.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::RawRecord;

/// TTL-bounded response cache
pub struct ResultCache {
    entries: HashMap<String, (RawRecord, DateTime<Utc>)>,
    duration: Duration,
}

impl ResultCache {
    /// Create a cache whose entries live for `duration_secs` seconds
    pub fn new(duration_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            duration: Duration::seconds(duration_secs as i64),
        }
    }

    /// Fetch a cached response, expiring it first if too old
    pub fn get(&mut self, key: &str) -> Option<RawRecord> {
        self.get_at(key, Utc::now())
    }

    /// Store a response under `key`, stamped with the current time
    pub fn set(&mut self, key: &str, value: RawRecord) {
        self.set_at(key, value, Utc::now());
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<RawRecord> {
        match self.entries.get(key) {
            Some((value, created)) if now - *created < self.duration => Some(value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set_at(&mut self, key: &str, value: RawRecord, now: DateTime<Utc>) {
        self.entries.insert(key.to_string(), (value, now));
    }
}
