//! File exports for lookup results
//!
//! All formats are downstream consumers of a `NormalizedResult`: pretty
//! JSON, `Field,Value` CSV (the nested Social Media map flattened per
//! platform), a flat text dump, and the framed long-form report.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value;

use super::display_value;
use crate::error::Result;
use crate::lookup::NormalizedResult;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Txt,
    Report,
}

/// Write `result` under `dir` in the given format, returning the file path
pub fn export_result(
    result: &NormalizedResult,
    dir: &Path,
    target: &str,
    format: ExportFormat,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let ext = match format {
        ExportFormat::Json => "json",
        ExportFormat::Csv => "csv",
        ExportFormat::Txt | ExportFormat::Report => "txt",
    };
    let name = match format {
        ExportFormat::Report => format!("{target}_{stamp}_report.{ext}"),
        _ => format!("{target}_{stamp}.{ext}"),
    };
    let path = dir.join(name);

    let contents = match format {
        ExportFormat::Json => serde_json::to_string_pretty(result)?,
        ExportFormat::Csv => to_csv(result),
        ExportFormat::Txt => to_txt(result),
        ExportFormat::Report => to_report(result),
    };

    std::fs::write(&path, contents)?;
    Ok(path)
}

fn to_csv(result: &NormalizedResult) -> String {
    let mut out = String::from("Field,Value\n");
    for (key, value) in result.iter() {
        match value {
            Value::Object(handles) => {
                for (platform, handle) in handles {
                    out.push_str(&csv_row(
                        &format!("{key} - {platform}"),
                        &display_value(handle),
                    ));
                }
            }
            other => out.push_str(&csv_row(key, &display_value(other))),
        }
    }
    out
}

fn csv_row(field: &str, value: &str) -> String {
    format!("{},{}\n", csv_escape(field), csv_escape(value))
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_txt(result: &NormalizedResult) -> String {
    let mut out = String::new();
    out.push_str(&"=".repeat(50));
    out.push_str("\nLACAK - HASIL PENCARIAN\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    for (key, value) in result.iter() {
        match value {
            Value::Object(handles) => {
                out.push_str(&format!("{key}:\n"));
                for (platform, handle) in handles {
                    out.push_str(&format!("  - {platform}: {}\n", display_value(handle)));
                }
            }
            other => out.push_str(&format!("{key}: {}\n", display_value(other))),
        }
    }

    out.push('\n');
    out.push_str(&"=".repeat(50));
    out.push('\n');
    out
}

fn to_report(result: &NormalizedResult) -> String {
    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();

    out.push_str(&format!("╔{}╗\n", "═".repeat(70)));
    out.push_str(&format!(
        "║{:^70}║\n",
        "LACAK - LAPORAN LENGKAP"
    ));
    out.push_str(&format!("╚{}╝\n\n", "═".repeat(70)));
    out.push_str(&format!("Generated: {stamp}\n\n"));

    out.push_str(&"=".repeat(72));
    out.push_str("\nINFORMASI DASAR\n");
    out.push_str(&"=".repeat(72));
    out.push('\n');

    for (key, value) in result.iter() {
        if !value.is_object() {
            out.push_str(&format!("{key:25} : {}\n", display_value(value)));
        }
    }

    if let Some(Value::Object(handles)) = result.get("Social Media") {
        out.push('\n');
        out.push_str(&"=".repeat(72));
        out.push_str("\nSOCIAL MEDIA\n");
        out.push_str(&"=".repeat(72));
        out.push('\n');
        for (platform, handle) in handles {
            out.push_str(&format!("{platform:25} : {}\n", display_value(handle)));
        }
    }

    out.push('\n');
    out.push_str(&"=".repeat(72));
    out.push_str("\nEND OF REPORT\n");
    out.push_str(&"=".repeat(72));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_result() -> NormalizedResult {
        let mut raw = crate::client::RawRecord::new();
        raw.insert("name".to_string(), json!("John Doe"));
        raw.insert("city".to_string(), json!("Jakarta, Pusat"));
        crate::lookup::normalize(&raw, Some("Telkomsel"))
    }

    #[test]
    fn test_export_json_parses_back() {
        let dir = TempDir::new().unwrap();
        let path =
            export_result(&sample_result(), dir.path(), "081234567890", ExportFormat::Json)
                .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["Nama"], "John Doe");
        assert!(path.extension().unwrap() == "json");
    }

    #[test]
    fn test_export_csv_flattens_and_escapes() {
        let dir = TempDir::new().unwrap();
        let path =
            export_result(&sample_result(), dir.path(), "081234567890", ExportFormat::Csv)
                .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Field,Value\n"));
        // Comma in the city value forces quoting
        assert!(contents.contains("\"Jakarta, Pusat\""));
        assert!(contents.contains("Social Media - Instagram"));
    }

    #[test]
    fn test_export_txt_contains_all_fields() {
        let dir = TempDir::new().unwrap();
        let path =
            export_result(&sample_result(), dir.path(), "081234567890", ExportFormat::Txt)
                .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("HASIL PENCARIAN"));
        assert!(contents.contains("Nama: John Doe"));
        assert!(contents.contains("Operator: Telkomsel"));
    }

    #[test]
    fn test_export_report_sections() {
        let dir = TempDir::new().unwrap();
        let path = export_result(
            &sample_result(),
            dir.path(),
            "081234567890",
            ExportFormat::Report,
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("LAPORAN LENGKAP"));
        assert!(contents.contains("INFORMASI DASAR"));
        assert!(contents.contains("SOCIAL MEDIA"));
        assert!(contents.contains("END OF REPORT"));
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
