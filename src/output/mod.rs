//! Output formatting for lookup results

use colored::Colorize;
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::lookup::normalize::TIMESTAMP_FIELD;
use crate::lookup::NormalizedResult;

pub mod export;

/// Render a JSON value for human display (strings unquoted)
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Print a normalized result in the requested format
pub fn print_result(result: &NormalizedResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Table => {
            println!("{}", format_field_table(result));
        }
        OutputFormat::Pretty => {
            print_pretty(result);
        }
    }
    Ok(())
}

fn print_pretty(result: &NormalizedResult) {
    println!("{}", "\nResult:".green().bold());
    for (key, value) in result.iter() {
        if key == TIMESTAMP_FIELD {
            println!("{}", format!("{key}: {}", display_value(value)).yellow());
        } else if let Value::Object(handles) = value {
            println!("\n{}", format!("{key}:").cyan());
            for (platform, handle) in handles {
                println!("{}", format!("  - {platform}: {}", display_value(handle)).cyan());
            }
        } else {
            println!("{}", format!("{key}: {}", display_value(value)).cyan());
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

fn format_field_table(result: &NormalizedResult) -> String {
    let rows: Vec<FieldRow> = result
        .iter()
        .flat_map(|(key, value)| match value {
            Value::Object(handles) => handles
                .iter()
                .map(|(platform, handle)| FieldRow {
                    field: format!("{key} - {platform}"),
                    value: display_value(handle),
                })
                .collect::<Vec<_>>(),
            other => vec![FieldRow {
                field: key.clone(),
                value: display_value(other),
            }],
        })
        .collect();

    table_of(&rows, "No result fields.")
}

/// Render rows as a rounded table, or the caller's note when empty
pub fn table_of<T: Tabled>(rows: &[T], empty_note: &str) -> String {
    if rows.is_empty() {
        return empty_note.to_string();
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
