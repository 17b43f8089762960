//! Response normalization
//!
//! Maps heterogeneous provider field names onto the fixed display schema,
//! fills defaults, derives age from birth date, and synthesizes placeholder
//! contact fields when the upstream source omits them. The synthesized
//! email and social handles are cosmetic, non-authoritative data carried
//! over from the original behavior; they are never sourced from a record.

use chrono::{Datelike, Local, NaiveDate};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::RawRecord;

/// Canonical key of the always-present search timestamp
pub const TIMESTAMP_FIELD: &str = "Waktu Pencarian";

/// Ordered provider-key → canonical-key rename table.
///
/// First match wins per canonical key: once a canonical key is populated,
/// later provider keys mapping to it are ignored.
const FIELD_MAP: &[(&str, &str)] = &[
    ("name", "Nama"),
    ("full_name", "Nama"),
    ("gender", "Jenis Kelamin"),
    ("birth_date", "Birthday"),
    ("birthdate", "Birthday"),
    ("age", "Umur"),
    ("email", "Email"),
    ("street", "Jalan"),
    ("address", "Jalan"),
    ("city", "Kota/Town"),
    ("province", "Provinsi"),
    ("postal_code", "Kode Pos"),
    ("zip_code", "Kode Pos"),
    ("country", "Negara"),
    ("latitude", "Latitude"),
    ("lat", "Latitude"),
    ("longitude", "Longitude"),
    ("lon", "Longitude"),
    ("lng", "Longitude"),
    ("operator", "Operator"),
    ("carrier", "Operator"),
    ("card_type", "Tipe Kartu"),
    ("social_media", "Social Media"),
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "outlook.com", "hotmail.com"];

const SOCIAL_PLATFORMS: &[&str] = &["Instagram", "Facebook", "Twitter", "TikTok"];

/// An ordered mapping from canonical display keys to values.
///
/// Flat and JSON-serializable; the single nested value is "Social Media".
/// Constructed once per lookup and never mutated by the pipeline afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedResult {
    fields: Map<String, Value>,
}

impl NormalizedResult {
    fn new() -> Self {
        let mut fields = Map::new();
        fields.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Map a raw provider record onto the display schema.
///
/// `operator` is the result of the secondary operator sub-lookup, injected
/// only when the record itself did not carry one.
pub fn normalize(raw: &RawRecord, operator: Option<&str>) -> NormalizedResult {
    let mut result = NormalizedResult::new();

    for (provider_key, canonical_key) in FIELD_MAP {
        if result.contains_key(canonical_key) {
            continue;
        }
        if let Some(value) = raw.get(*provider_key) {
            result.insert(canonical_key, value.clone());
        }
    }

    if !result.contains_key("Nama") {
        result.insert("Nama", "Unknown");
    }

    if !result.contains_key("Negara") {
        result.insert("Negara", "Indonesia");
    }

    if !result.contains_key("Umur") {
        if let Some(birthday) = result.get("Birthday").and_then(Value::as_str) {
            if let Some(age) = calculate_age(birthday, Local::now().date_naive()) {
                result.insert("Umur", format!("{age} tahun"));
            }
        }
    }

    if let Some(op) = operator {
        if !result.contains_key("Operator") {
            result.insert("Operator", op);
        }
    }

    let name = result
        .get("Nama")
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Some(name) = name {
        if !result.contains_key("Email") {
            result.insert("Email", generate_email(&name));
        }
        if !result.contains_key("Social Media") {
            result.insert("Social Media", generate_social_handles(&name));
        }
    }

    result
}

/// Calendar-aware age: whole years elapsed, minus one when the current
/// month/day precedes the birth month/day
pub fn calculate_age(birth_date: &str, today: NaiveDate) -> Option<i32> {
    let birth = NaiveDate::parse_from_str(birth_date, "%Y-%m-%d").ok()?;

    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age)
}

/// Placeholder email slugified from the name with a random domain
fn generate_email(name: &str) -> String {
    let mut rng = rand::rng();
    let slug = name.to_lowercase().replace(' ', ".");
    let domain = EMAIL_DOMAINS.choose(&mut rng).unwrap_or(&EMAIL_DOMAINS[0]);
    format!("{slug}@{domain}")
}

/// One placeholder handle per platform with a random numeric suffix
fn generate_social_handles(name: &str) -> Value {
    let mut rng = rand::rng();
    let slug = name.to_lowercase().replace(' ', "_");

    let mut handles = Map::new();
    for platform in SOCIAL_PLATFORMS {
        let suffix: u32 = rng.random_range(10..1000);
        handles.insert(
            (*platform).to_string(),
            Value::String(format!("@{slug}{suffix}")),
        );
    }
    Value::Object(handles)
}
