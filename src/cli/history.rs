//! Search history command implementations

use std::collections::HashMap;

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::Result;
use crate::output::{display_value, table_of};
use crate::store::LocalStore;

const CHART_WIDTH: usize = 30;

#[derive(Tabled, Serialize)]
struct HistoryRow {
    #[tabled(rename = "#")]
    id: i64,
    #[tabled(rename = "TARGET")]
    target: String,
    #[tabled(rename = "TIME")]
    timestamp: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CITY")]
    city: String,
}

fn result_field(result: &Value, key: &str) -> String {
    result
        .get(key)
        .map(display_value)
        .unwrap_or_else(|| "-".to_string())
}

/// List past searches, oldest first
pub fn list(limit: Option<usize>, format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let config = Config::load_at(config_path)?;
    let store = LocalStore::open_at(&config.db_path()?)?;

    let entries = store.history(limit)?;
    let rows: Vec<HistoryRow> = entries
        .iter()
        .map(|entry| HistoryRow {
            id: entry.id,
            target: entry.target.clone(),
            timestamp: entry.timestamp.clone(),
            name: result_field(&entry.result, "Nama"),
            city: result_field(&entry.result, "Kota/Town"),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        _ => println!("{}", table_of(&rows, "No search history yet.")),
    }
    Ok(())
}

/// Summarize past searches
pub fn stats(config_path: Option<&str>) -> Result<()> {
    let config = Config::load_at(config_path)?;
    let store = LocalStore::open_at(&config.db_path()?)?;

    let entries = store.history(None)?;
    if entries.is_empty() {
        println!("{}", "No search history yet.".yellow());
        return Ok(());
    }

    let phones = entries
        .iter()
        .filter(|e| e.target.starts_with(&config.search.phone_prefix))
        .count();
    let niks = entries.len() - phones;

    println!("{}\n", "Search History Stats".bold());
    println!("Total searches: {}", entries.len());
    println!("  Phone: {phones}");
    println!("  NIK:   {niks}");
    // history() returns oldest first
    println!("First search: {}", entries[0].timestamp);
    println!("Last search:  {}", entries[entries.len() - 1].timestamp);

    let mut cities: HashMap<String, usize> = HashMap::new();
    for entry in &entries {
        if let Some(city) = entry.result.get("Kota/Town").and_then(Value::as_str) {
            *cities.entry(city.to_string()).or_default() += 1;
        }
    }

    if !cities.is_empty() {
        let mut ranked: Vec<(String, usize)> = cities.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(5);

        println!("\n{}", "Top cities:".bold());
        let width = ranked.iter().map(|(city, _)| city.len()).max().unwrap_or(0);
        let max = ranked.first().map(|(_, n)| *n).unwrap_or(1);
        for (city, count) in &ranked {
            let bar_len = (count * CHART_WIDTH).div_ceil(max);
            println!("  {city:width$} | {} {count}", "█".repeat(bar_len).cyan());
        }
    }

    Ok(())
}

/// Delete all history entries
pub fn clear(yes: bool, config_path: Option<&str>) -> Result<()> {
    let config = Config::load_at(config_path)?;
    let store = LocalStore::open_at(&config.db_path()?)?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Delete all search history?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let deleted = store.clear_history()?;
    println!("{} Deleted {deleted} history entries", "✓".green());
    Ok(())
}
