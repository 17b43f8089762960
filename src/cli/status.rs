//! Status command implementation

use colored::Colorize;

use crate::config::Config;
use crate::error::Result;

/// Show the configuration state without touching the network
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "Lacak Configuration Status".bold());

    let config = match Config::load_at(config_path) {
        Ok(config) => config,
        Err(err) => {
            println!("{} No configuration found ({err})", "✗".red());
            println!("  → Run 'lacak init' to configure");
            return Ok(());
        }
    };

    let path = match config_path {
        Some(p) => std::path::PathBuf::from(p),
        None => Config::default_path()?,
    };
    println!("Config file: {}", path.display().to_string().cyan());
    println!();

    if config.remote_configured() {
        println!("{} Remote API enabled, key configured", "✓".green());
    } else if config.api.enabled {
        println!("{} Remote API enabled but no key set", "⚠".yellow());
        println!("  → Run 'lacak init' to set one");
    } else {
        println!("{} Remote API disabled", "✗".red());
    }

    let endpoints = [
        ("phone lookup", &config.api.endpoints.phone_lookup),
        ("NIK lookup", &config.api.endpoints.nik_lookup),
        ("operator check", &config.api.endpoints.operator_check),
    ];
    for (label, endpoint) in endpoints {
        match endpoint {
            Some(url) => println!("  {label}: {}", url.dimmed()),
            None => println!("  {label}: {}", "not set".dimmed()),
        }
    }

    println!();

    if config.database.enabled {
        let db_path = config.db_path()?;
        if db_path.exists() {
            println!(
                "{} Local database enabled: {}",
                "✓".green(),
                db_path.display()
            );
        } else {
            println!(
                "{} Local database enabled but missing: {}",
                "⚠".yellow(),
                db_path.display()
            );
            println!("  → Run 'lacak db init' to create it");
        }
    } else {
        println!("{} Local database disabled", "✗".red());
    }

    println!();

    if config.rate_limit.enabled {
        println!(
            "Rate limit: {} requests per {}s",
            config.rate_limit.max_requests, config.rate_limit.window_secs
        );
    } else {
        println!("Rate limit: {}", "disabled".yellow());
    }

    if config.cache.enabled {
        println!("Result cache: {}s TTL", config.cache.duration_secs);
    } else {
        println!("Result cache: {}", "disabled".yellow());
    }

    Ok(())
}
