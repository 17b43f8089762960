//! SQLite-backed local store
//!
//! The first, free tier of the lookup pipeline: two exact-match tables
//! (phone numbers and NIKs) plus the persisted search history. A connection
//! is opened and closed per call. Pipeline-facing operations fail closed:
//! storage faults are logged and surfaced as absence, never propagated.

use std::path::{Path, PathBuf};

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::client::RawRecord;
use crate::config::Config;
use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS phone_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number TEXT UNIQUE NOT NULL,
    name TEXT,
    address TEXT,
    city TEXT,
    province TEXT,
    operator TEXT,
    last_updated TEXT
);

CREATE TABLE IF NOT EXISTS nik_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nik TEXT UNIQUE NOT NULL,
    name TEXT,
    birth_date TEXT,
    gender TEXT,
    address TEXT,
    city TEXT,
    province TEXT,
    last_updated TEXT
);

CREATE TABLE IF NOT EXISTS search_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    target TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    result TEXT NOT NULL
);
"#;

/// A phone row as written by import or lookup population
#[derive(Debug, Clone, Default)]
pub struct PhoneRecord {
    pub phone_number: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub operator: Option<String>,
}

/// A national-ID row
#[derive(Debug, Clone, Default)]
pub struct NikRecord {
    pub nik: String,
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
}

/// A persisted search history entry
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: i64,
    pub target: String,
    pub timestamp: String,
    pub result: Value,
}

/// Local key/value record store
pub struct LocalStore {
    path: PathBuf,
    initialized: bool,
}

impl LocalStore {
    /// Open the store at the configured path.
    ///
    /// Never fails: when the database is disabled or cannot be initialized
    /// the store stays inert and every query reports absence.
    pub fn open(config: &Config) -> Self {
        if !config.database.enabled {
            return Self {
                path: PathBuf::new(),
                initialized: false,
            };
        }

        let path = match config.db_path() {
            Ok(p) => p,
            Err(e) => {
                log::error!("Cannot resolve database path: {e}");
                return Self {
                    path: PathBuf::new(),
                    initialized: false,
                };
            }
        };

        match Self::open_at(&path) {
            Ok(store) => store,
            Err(e) => {
                log::error!("Database initialization error: {e}");
                Self {
                    path,
                    initialized: false,
                }
            }
        }
    }

    /// Open the store at a specific path, creating the schema if absent
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Io(format!("Failed to create db dir: {e}")))?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            path: path.to_path_buf(),
            initialized: true,
        })
    }

    /// Whether the store is usable
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn conn(&self) -> Result<Connection, StoreError> {
        if !self.initialized {
            return Err(StoreError::Disabled);
        }
        Ok(Connection::open(&self.path)?)
    }

    /// Exact-match phone lookup. Absent on miss or any storage fault.
    pub fn query_phone(&self, number: &str) -> Option<RawRecord> {
        if !self.initialized {
            return None;
        }

        match self.try_query_phone(number) {
            Ok(record) => record,
            Err(e) => {
                log::error!("Database query error: {e}");
                None
            }
        }
    }

    /// Exact-match NIK lookup. Absent on miss or any storage fault.
    pub fn query_nik(&self, nik: &str) -> Option<RawRecord> {
        if !self.initialized {
            return None;
        }

        match self.try_query_nik(nik) {
            Ok(record) => record,
            Err(e) => {
                log::error!("Database query error: {e}");
                None
            }
        }
    }

    /// Upsert a phone record. `false` on any storage fault.
    pub fn add_phone_record(&self, record: &PhoneRecord) -> bool {
        if !self.initialized {
            return false;
        }

        let result = self.conn().and_then(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO phone_records
                 (phone_number, name, address, city, province, operator, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.phone_number,
                    record.name,
                    record.address,
                    record.city,
                    record.province,
                    record.operator,
                    now_stamp(),
                ],
            )
            .map_err(StoreError::from)
        });

        match result {
            Ok(_) => true,
            Err(e) => {
                log::error!("Error adding phone record: {e}");
                false
            }
        }
    }

    /// Upsert a NIK record. `false` on any storage fault.
    pub fn add_nik_record(&self, record: &NikRecord) -> bool {
        if !self.initialized {
            return false;
        }

        let result = self.conn().and_then(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO nik_records
                 (nik, name, birth_date, gender, address, city, province, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.nik,
                    record.name,
                    record.birth_date,
                    record.gender,
                    record.address,
                    record.city,
                    record.province,
                    now_stamp(),
                ],
            )
            .map_err(StoreError::from)
        });

        match result {
            Ok(_) => true,
            Err(e) => {
                log::error!("Error adding NIK record: {e}");
                false
            }
        }
    }

    /// Append a normalized result to the search history. `false` on fault.
    pub fn record_search(&self, target: &str, result: &Value) -> bool {
        if !self.initialized {
            return false;
        }

        let outcome = self.conn().and_then(|conn| {
            conn.execute(
                "INSERT INTO search_history (target, timestamp, result) VALUES (?1, ?2, ?3)",
                params![target, now_stamp(), result.to_string()],
            )
            .map_err(StoreError::from)
        });

        match outcome {
            Ok(_) => true,
            Err(e) => {
                log::error!("Error recording search: {e}");
                false
            }
        }
    }

    /// List history entries, oldest first
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>, StoreError> {
        let conn = self.conn()?;
        let sql = match limit {
            Some(n) => format!(
                "SELECT id, target, timestamp, result FROM search_history
                 ORDER BY id DESC LIMIT {n}"
            ),
            None => "SELECT id, target, timestamp, result FROM search_history ORDER BY id DESC"
                .to_string(),
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, target, timestamp, result) = row?;
            let result = serde_json::from_str(&result).unwrap_or(Value::Null);
            entries.push(HistoryEntry {
                id,
                target,
                timestamp,
                result,
            });
        }
        entries.reverse();
        Ok(entries)
    }

    /// Delete all history entries, returning how many were removed
    pub fn clear_history(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM search_history", [])?;
        Ok(removed)
    }

    /// Total number of phone records
    pub fn phone_count(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM phone_records", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    /// Phone records in insertion order, capped at `limit`
    pub fn list_phones(&self, limit: usize) -> Result<Vec<PhoneRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT phone_number, name, address, city, province, operator
             FROM phone_records ORDER BY id LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(PhoneRecord {
                phone_number: row.get(0)?,
                name: row.get(1)?,
                address: row.get(2)?,
                city: row.get(3)?,
                province: row.get(4)?,
                operator: row.get(5)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Delete a phone record, reporting whether one existed
    pub fn delete_phone(&self, number: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM phone_records WHERE phone_number = ?1",
            params![number],
        )?;
        Ok(removed > 0)
    }

    /// Delete a NIK record, reporting whether one existed
    pub fn delete_nik(&self, nik: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM nik_records WHERE nik = ?1", params![nik])?;
        Ok(removed > 0)
    }

    fn try_query_phone(&self, number: &str) -> Result<Option<RawRecord>, StoreError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT phone_number, name, address, city, province, operator, last_updated
                 FROM phone_records WHERE phone_number = ?1",
                params![number],
                |row| {
                    let mut record = RawRecord::new();
                    push_field(&mut record, "phone_number", row.get(0)?);
                    push_field(&mut record, "name", row.get(1)?);
                    push_field(&mut record, "address", row.get(2)?);
                    push_field(&mut record, "city", row.get(3)?);
                    push_field(&mut record, "province", row.get(4)?);
                    push_field(&mut record, "operator", row.get(5)?);
                    push_field(&mut record, "last_updated", row.get(6)?);
                    Ok(record)
                },
            )
            .optional()?;
        Ok(row)
    }

    fn try_query_nik(&self, nik: &str) -> Result<Option<RawRecord>, StoreError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT nik, name, birth_date, gender, address, city, province, last_updated
                 FROM nik_records WHERE nik = ?1",
                params![nik],
                |row| {
                    let mut record = RawRecord::new();
                    push_field(&mut record, "nik", row.get(0)?);
                    push_field(&mut record, "name", row.get(1)?);
                    push_field(&mut record, "birth_date", row.get(2)?);
                    push_field(&mut record, "gender", row.get(3)?);
                    push_field(&mut record, "address", row.get(4)?);
                    push_field(&mut record, "city", row.get(5)?);
                    push_field(&mut record, "province", row.get(6)?);
                    push_field(&mut record, "last_updated", row.get(7)?);
                    Ok(record)
                },
            )
            .optional()?;
        Ok(row)
    }
}

/// Insert a column into the record, omitting NULLs entirely
fn push_field(record: &mut RawRecord, key: &str, value: Option<String>) {
    if let Some(v) = value {
        record.insert(key.to_string(), Value::String(v));
    }
}

fn now_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Empty store for when the local tier is disabled (queries report absence)
impl Default for LocalStore {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            initialized: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (LocalStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open_at(&dir.path().join("local.db")).unwrap();
        (store, dir)
    }

    fn sample_phone() -> PhoneRecord {
        PhoneRecord {
            phone_number: "081234567890".to_string(),
            name: Some("John Doe".to_string()),
            address: Some("Jl. Sudirman 1".to_string()),
            city: Some("Jakarta".to_string()),
            province: Some("DKI Jakarta".to_string()),
            operator: Some("Telkomsel".to_string()),
        }
    }

    #[test]
    fn test_add_and_query_phone() {
        let (store, _dir) = test_store();
        assert!(store.add_phone_record(&sample_phone()));

        let record = store.query_phone("081234567890").unwrap();
        assert_eq!(record.get("name").unwrap(), "John Doe");
        assert_eq!(record.get("city").unwrap(), "Jakarta");
        assert!(record.contains_key("last_updated"));
    }

    #[test]
    fn test_query_phone_miss() {
        let (store, _dir) = test_store();
        assert!(store.query_phone("089999999999").is_none());
    }

    #[test]
    fn test_upsert_overwrites_existing_key() {
        let (store, _dir) = test_store();
        store.add_phone_record(&sample_phone());

        let mut updated = sample_phone();
        updated.name = Some("Jane Doe".to_string());
        assert!(store.add_phone_record(&updated));

        let record = store.query_phone("081234567890").unwrap();
        assert_eq!(record.get("name").unwrap(), "Jane Doe");
    }

    #[test]
    fn test_null_columns_omitted_from_record() {
        let (store, _dir) = test_store();
        store.add_phone_record(&PhoneRecord {
            phone_number: "081200000000".to_string(),
            name: Some("Minimal".to_string()),
            ..Default::default()
        });

        let record = store.query_phone("081200000000").unwrap();
        assert!(record.contains_key("name"));
        assert!(!record.contains_key("address"));
        assert!(!record.contains_key("operator"));
    }

    #[test]
    fn test_add_and_query_nik() {
        let (store, _dir) = test_store();
        let nik = NikRecord {
            nik: "3174012345678901".to_string(),
            name: Some("Jane Doe".to_string()),
            birth_date: Some("1990-01-01".to_string()),
            gender: Some("Perempuan".to_string()),
            city: Some("Bandung".to_string()),
            ..Default::default()
        };
        assert!(store.add_nik_record(&nik));

        let record = store.query_nik("3174012345678901").unwrap();
        assert_eq!(record.get("birth_date").unwrap(), "1990-01-01");
        assert_eq!(record.get("gender").unwrap(), "Perempuan");
    }

    #[test]
    fn test_uninitialized_store_fails_closed() {
        let store = LocalStore::default();
        assert!(!store.is_initialized());
        assert!(store.query_phone("081234567890").is_none());
        assert!(store.query_nik("3174012345678901").is_none());
        assert!(!store.add_phone_record(&sample_phone()));
        assert!(!store.record_search("081234567890", &serde_json::json!({})));
    }

    #[test]
    fn test_schema_init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local.db");
        let first = LocalStore::open_at(&path).unwrap();
        first.add_phone_record(&sample_phone());

        // Reopening must not clobber existing rows
        let second = LocalStore::open_at(&path).unwrap();
        assert!(second.query_phone("081234567890").is_some());
    }

    #[test]
    fn test_history_roundtrip_and_clear() {
        let (store, _dir) = test_store();
        let result = serde_json::json!({"Nama": "John Doe", "Kota/Town": "Jakarta"});
        assert!(store.record_search("081234567890", &result));
        assert!(store.record_search("3174012345678901", &result));

        let entries = store.history(None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].target, "081234567890");
        assert_eq!(entries[0].result.get("Nama").unwrap(), "John Doe");

        let removed = store.clear_history().unwrap();
        assert_eq!(removed, 2);
        assert!(store.history(None).unwrap().is_empty());
    }

    #[test]
    fn test_list_phones_ordered_and_capped() {
        let (store, _dir) = test_store();
        for i in 0..4 {
            store.add_phone_record(&PhoneRecord {
                phone_number: format!("0812345678{i:02}"),
                name: Some(format!("Person {i}")),
                ..Default::default()
            });
        }

        assert_eq!(store.phone_count().unwrap(), 4);
        let records = store.list_phones(2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].phone_number, "081234567800");
        assert_eq!(records[1].phone_number, "081234567801");
    }

    #[test]
    fn test_delete_phone_reports_presence() {
        let (store, _dir) = test_store();
        store.add_phone_record(&sample_phone());

        assert!(store.delete_phone("081234567890").unwrap());
        assert!(store.query_phone("081234567890").is_none());
        // Second delete finds nothing
        assert!(!store.delete_phone("081234567890").unwrap());
    }

    #[test]
    fn test_delete_nik_reports_presence() {
        let (store, _dir) = test_store();
        store.add_nik_record(&NikRecord {
            nik: "3174012345678901".to_string(),
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        });

        assert!(store.delete_nik("3174012345678901").unwrap());
        assert!(!store.delete_nik("3174012345678901").unwrap());
    }

    #[test]
    fn test_history_limit_returns_most_recent() {
        let (store, _dir) = test_store();
        for i in 0..5 {
            let result = serde_json::json!({"Nama": format!("Person {i}")});
            store.record_search(&format!("0812345678{i:02}"), &result);
        }

        let entries = store.history(Some(2)).unwrap();
        assert_eq!(entries.len(), 2);
        // Oldest-first ordering over the most recent two
        assert_eq!(entries[0].target, "081234567803");
        assert_eq!(entries[1].target, "081234567804");
    }
}
