//! Lookup and batch command implementations

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{KindArg, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lookup::Pipeline;
use crate::output::export::{export_result, ExportFormat};
use crate::output::print_result;

/// Batch files are truncated to this many targets
const MAX_BATCH_TARGETS: usize = 100;

/// Run a single lookup
pub async fn run(
    target: &str,
    kind: KindArg,
    export: Option<ExportFormat>,
    format: OutputFormat,
    config_path: Option<&str>,
    no_cache: bool,
) -> Result<()> {
    let mut config = Config::load_at(config_path)?;
    if no_cache {
        config.cache.enabled = false;
    }
    let mut pipeline = Pipeline::from_config(&config)?;

    let Some(result) = pipeline
        .lookup_normalized(target, kind.to_target_kind())
        .await?
    else {
        println!("{}", "No results found.".yellow());
        if !config.remote_configured() {
            println!("  → Remote API is not configured; run 'lacak init'");
        }
        return Ok(());
    };

    pipeline.store().record_search(target, &result.as_value());
    print_result(&result, format)?;

    if let Some(fmt) = export {
        let path = export_result(&result, &config.export_dir, target, fmt)?;
        println!("\nExported to {}", path.display().to_string().cyan());
    }

    Ok(())
}

/// Run lookups for every target in a file, one per line
pub async fn batch(
    file: &str,
    export: Option<ExportFormat>,
    format: OutputFormat,
    config_path: Option<&str>,
    no_cache: bool,
) -> Result<()> {
    let mut config = Config::load_at(config_path)?;
    if no_cache {
        config.cache.enabled = false;
    }
    let mut pipeline = Pipeline::from_config(&config)?;

    let contents = std::fs::read_to_string(file)?;
    let mut targets: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    if targets.len() > MAX_BATCH_TARGETS {
        println!(
            "{}",
            format!(
                "File lists {} targets; only the first {} will be processed.",
                targets.len(),
                MAX_BATCH_TARGETS
            )
            .yellow()
        );
        targets.truncate(MAX_BATCH_TARGETS);
    }

    if targets.is_empty() {
        println!("{}", "No targets found in file.".yellow());
        return Ok(());
    }

    let bar = ProgressBar::new(targets.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| Error::Other(e.to_string()))?
            .progress_chars("#>-"),
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    let mut found = 0usize;
    let mut missed = 0usize;
    let mut invalid = 0usize;
    let mut failed = 0usize;

    for target in &targets {
        bar.set_message(target.to_string());

        match pipeline.lookup_normalized(target, None).await {
            Ok(Some(result)) => {
                found += 1;
                pipeline.store().record_search(target, &result.as_value());
                bar.suspend(|| {
                    println!("\n{}", format!("=== {target} ===").bold());
                    let _ = print_result(&result, format);
                    if let Some(fmt) = export {
                        match export_result(&result, &config.export_dir, target, fmt) {
                            Ok(path) => println!("Exported to {}", path.display()),
                            Err(err) => println!("{}", format!("Export failed: {err}").red()),
                        }
                    }
                });
            }
            Ok(None) => {
                missed += 1;
                bar.suspend(|| println!("{}", format!("{target}: no results").dimmed()));
            }
            Err(Error::UnrecognizedTarget(_)) => {
                invalid += 1;
                bar.suspend(|| {
                    println!("{}", format!("{target}: skipped (unrecognized)").yellow())
                });
            }
            // A bad credential fails every remaining target the same way
            Err(err @ Error::Api(crate::error::ApiError::Unauthorized)) => {
                bar.abandon();
                return Err(err);
            }
            Err(err) => {
                failed += 1;
                bar.suspend(|| println!("{}", format!("{target}: {err}").red()));
            }
        }

        bar.inc(1);
    }

    bar.finish_and_clear();

    println!("\n{}", "Batch complete".bold());
    println!("  Found:   {found}");
    println!("  Missing: {missed}");
    if invalid > 0 {
        println!("  Invalid: {invalid}");
    }
    if failed > 0 {
        println!("  Failed:  {failed}");
    }

    Ok(())
}
