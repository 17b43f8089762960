//! Local database command implementations

use std::path::Path;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::{ConfigError, Error, Result};
use crate::output::table_of;
use crate::store::{LocalStore, NikRecord, PhoneRecord};

fn load_config(config_path: Option<&str>) -> Result<Config> {
    // Database management works without a config file
    match Config::load_at(config_path) {
        Ok(config) => Ok(config),
        Err(Error::Config(ConfigError::NotFound)) => Ok(Config::default()),
        Err(err) => Err(err),
    }
}

fn open_store(config: &Config) -> Result<LocalStore> {
    let path = config.db_path()?;
    LocalStore::open_at(&path).map_err(Into::into)
}

/// Create the database file and schema
pub fn init(config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let path = config.db_path()?;
    LocalStore::open_at(&path)?;

    println!(
        "{} Database ready at {}",
        "✓".green(),
        path.display().to_string().cyan()
    );
    if !config.database.enabled {
        println!("  → The database tier is disabled in config; run 'lacak init' to enable it.");
    }
    Ok(())
}

/// Insert or replace a phone record
#[allow(clippy::too_many_arguments)]
pub fn add_phone(
    number: String,
    name: Option<String>,
    address: Option<String>,
    city: Option<String>,
    province: Option<String>,
    operator: Option<String>,
    config_path: Option<&str>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let record = PhoneRecord {
        phone_number: number.clone(),
        name,
        address,
        city,
        province,
        operator,
    };

    if store.add_phone_record(&record) {
        println!("{} Stored phone record for {number}", "✓".green());
        Ok(())
    } else {
        Err(Error::Other(format!("Could not store record for {number}")))
    }
}

/// Insert or replace a NIK record
#[allow(clippy::too_many_arguments)]
pub fn add_nik(
    nik: String,
    name: Option<String>,
    birth_date: Option<String>,
    gender: Option<String>,
    address: Option<String>,
    city: Option<String>,
    province: Option<String>,
    config_path: Option<&str>,
) -> Result<()> {
    let config = load_config(config_path)?;

    if nik.len() != config.search.nik_length {
        return Err(Error::Other(format!(
            "NIK must be {} characters, got {}",
            config.search.nik_length,
            nik.len()
        )));
    }

    let store = open_store(&config)?;
    let record = NikRecord {
        nik: nik.clone(),
        name,
        birth_date,
        gender,
        address,
        city,
        province,
    };

    if store.add_nik_record(&record) {
        println!("{} Stored NIK record for {nik}", "✓".green());
        Ok(())
    } else {
        Err(Error::Other(format!("Could not store record for {nik}")))
    }
}

/// Show the stored record for a target, without touching the API
pub fn get(target: &str, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let record = if target.starts_with(&config.search.phone_prefix) {
        store.query_phone(target)
    } else if target.len() == config.search.nik_length {
        store.query_nik(target)
    } else {
        return Err(Error::UnrecognizedTarget(target.to_string()));
    };

    match record {
        Some(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        None => println!("{}", format!("No stored record for {target}").yellow()),
    }
    Ok(())
}

/// One row of a JSON or CSV import file
#[derive(Debug, Deserialize)]
struct ImportRow {
    phone_number: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    province: Option<String>,
    #[serde(default)]
    operator: Option<String>,
}

impl From<ImportRow> for PhoneRecord {
    fn from(row: ImportRow) -> Self {
        PhoneRecord {
            phone_number: row.phone_number,
            name: row.name,
            address: row.address,
            city: row.city,
            province: row.province,
            operator: row.operator,
        }
    }
}

/// Bulk-import phone records from a JSON array or a headered CSV file
pub fn import(file: &str, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let contents = std::fs::read_to_string(file)?;
    let extension = Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let rows = match extension.as_deref() {
        Some("json") => parse_json_rows(&contents)?,
        Some("csv") => parse_csv_rows(&contents),
        _ => {
            return Err(Error::Other(format!(
                "Unsupported import format for '{file}' (expected .json or .csv)"
            )))
        }
    };

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for row in rows {
        match row {
            Some(row) => {
                let number = row.phone_number.clone();
                if store.add_phone_record(&row.into()) {
                    imported += 1;
                } else {
                    log::warn!("Could not store record for {number}");
                    skipped += 1;
                }
            }
            None => skipped += 1,
        }
    }

    println!("{} Imported {imported} records from {file}", "✓".green());
    if skipped > 0 {
        println!("{}", format!("  Skipped {skipped} invalid records").yellow());
    }
    Ok(())
}

/// Each element becomes a row; malformed elements are skipped, not fatal
fn parse_json_rows(contents: &str) -> Result<Vec<Option<ImportRow>>> {
    let values: Vec<Value> = serde_json::from_str(contents)?;
    Ok(values
        .into_iter()
        .map(|value| {
            serde_json::from_value::<ImportRow>(value)
                .ok()
                .filter(|row| !row.phone_number.is_empty())
        })
        .collect())
}

fn parse_csv_rows(contents: &str) -> Vec<Option<ImportRow>> {
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let headers = split_csv_line(header);

    lines
        .map(|line| {
            let fields = split_csv_line(line);
            let get = |name: &str| {
                headers
                    .iter()
                    .position(|h| h == name)
                    .and_then(|i| fields.get(i))
                    .filter(|v| !v.is_empty())
                    .cloned()
            };

            let phone_number = get("phone_number")?;
            Some(ImportRow {
                phone_number,
                name: get("name"),
                address: get("address"),
                city: get("city"),
                province: get("province"),
                operator: get("operator"),
            })
        })
        .collect()
}

/// Split one CSV line, honoring double-quoted fields with `""` escapes
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

#[derive(Tabled, Serialize)]
struct PhoneRow {
    #[tabled(rename = "PHONE")]
    phone_number: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CITY")]
    city: String,
    #[tabled(rename = "OPERATOR")]
    operator: String,
}

/// List stored phone records
pub fn list(limit: usize, format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let total = store.phone_count()?;
    let rows: Vec<PhoneRow> = store
        .list_phones(limit)?
        .into_iter()
        .map(|record| PhoneRow {
            phone_number: record.phone_number,
            name: record.name.unwrap_or_else(|| "-".to_string()),
            city: record.city.unwrap_or_else(|| "-".to_string()),
            operator: record.operator.unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        _ => {
            println!("Total records: {total}");
            println!("{}", table_of(&rows, "Database is empty."));
        }
    }
    Ok(())
}

/// Delete the stored record for a target
pub fn delete(target: &str, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let removed = if target.starts_with(&config.search.phone_prefix) {
        store.delete_phone(target)?
    } else if target.len() == config.search.nik_length {
        store.delete_nik(target)?
    } else {
        return Err(Error::UnrecognizedTarget(target.to_string()));
    };

    if removed {
        println!("{} Deleted record for {target}", "✓".green());
    } else {
        println!("{}", format!("No stored record for {target}").yellow());
    }
    Ok(())
}
