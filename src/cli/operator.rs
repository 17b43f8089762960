//! Operator command implementations

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::{ConfigError, Error, Result};
use crate::lookup::operator::{detect_operator, OPERATOR_PREFIXES};
use crate::lookup::Pipeline;
use crate::output::table_of;

/// Resolve the carrier for a phone number
pub async fn check(phone: &str, config_path: Option<&str>) -> Result<()> {
    // Works without a config file; the prefix table is local
    let config = match Config::load_at(config_path) {
        Ok(config) => config,
        Err(Error::Config(ConfigError::NotFound)) => Config::default(),
        Err(err) => return Err(err),
    };

    match detect_operator(phone, &config.search.phone_prefix) {
        "N/A" => println!("{phone}: {}", "N/A (not a phone number)".yellow()),
        "Unknown" => {
            // Unmapped prefix; the remote tier may still know it
            let mut pipeline = Pipeline::from_config(&config)?;
            let operator = pipeline.operator(phone).await?;
            if operator == "Unknown" {
                println!("{phone}: {}", operator.yellow());
            } else {
                println!("{phone}: {}", operator.green().bold());
            }
        }
        operator => println!("{phone}: {}", operator.green().bold()),
    }
    Ok(())
}

#[derive(Tabled, Serialize)]
struct OperatorRow {
    #[tabled(rename = "OPERATOR")]
    operator: String,
    #[tabled(rename = "PREFIXES")]
    prefixes: String,
}

/// List the known carrier prefixes grouped by operator
pub fn list(format: OutputFormat) -> Result<()> {
    // Group in table order, keeping the first-seen carrier order
    let mut rows: Vec<OperatorRow> = Vec::new();
    for (prefix, operator) in OPERATOR_PREFIXES {
        match rows.iter_mut().find(|row| row.operator == *operator) {
            Some(row) => {
                row.prefixes.push_str(", ");
                row.prefixes.push_str(prefix);
            }
            None => rows.push(OperatorRow {
                operator: (*operator).to_string(),
                prefixes: (*prefix).to_string(),
            }),
        }
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        _ => println!("{}", table_of(&rows, "No known prefixes.")),
    }
    Ok(())
}
