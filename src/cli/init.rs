//! Init command implementation

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

use crate::config::Config;
use crate::error::{ConfigError, Error, Result};

/// Run the interactive setup and write the config file
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}", "Welcome to lacak!".bold().green());
    println!("Let's set up your lookup configuration.\n");

    // Start from the existing config so a re-run keeps unrelated settings
    let mut config = match Config::load_at(config_path) {
        Ok(existing) => existing,
        Err(Error::Config(ConfigError::NotFound)) => Config::default(),
        Err(err) => return Err(err),
    };

    let api_key: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API key (leave empty to run offline)")
        .allow_empty_password(true)
        .interact()?;

    if api_key.is_empty() {
        println!(
            "{}",
            "No API key given; remote lookups stay disabled.".yellow()
        );
        config.api.enabled = false;
        config.api.key = None;
    } else {
        config.api.enabled = true;
        config.api.key = Some(api_key);

        let phone_endpoint: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Phone lookup endpoint")
            .default(
                config
                    .api
                    .endpoints
                    .phone_lookup
                    .clone()
                    .unwrap_or_else(|| "https://api.example.com/v1/phone/lookup".to_string()),
            )
            .interact_text()?;
        config.api.endpoints.phone_lookup = Some(phone_endpoint);

        let nik_endpoint: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("NIK lookup endpoint")
            .default(
                config
                    .api
                    .endpoints
                    .nik_lookup
                    .clone()
                    .unwrap_or_else(|| "https://api.example.com/v1/nik/lookup".to_string()),
            )
            .interact_text()?;
        config.api.endpoints.nik_lookup = Some(nik_endpoint);

        let operator_endpoint: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Operator check endpoint (optional, empty to skip)")
            .default(
                config
                    .api
                    .endpoints
                    .operator_check
                    .clone()
                    .unwrap_or_default(),
            )
            .allow_empty(true)
            .interact_text()?;
        config.api.endpoints.operator_check =
            (!operator_endpoint.is_empty()).then_some(operator_endpoint);
    }

    config.database.enabled = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Enable the local database tier?")
        .default(config.database.enabled)
        .interact()?;

    let path = match config_path {
        Some(p) => std::path::PathBuf::from(p),
        None => Config::default_path()?,
    };
    config.save_to(path.clone())?;

    println!(
        "\n{} Configuration saved to {}",
        "✓".green(),
        path.display().to_string().cyan()
    );
    if config.database.enabled {
        println!("  Run 'lacak db init' to create the local database.");
    }
    Ok(())
}
