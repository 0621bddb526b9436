//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let updated = set_value(&settings, key, value)?;
            updated.save_to(&config_path)?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::kv("Config file", &config_path.display().to_string());
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
            Output::info(&format!("Opening config in {}...", editor));

            match std::process::Command::new(&editor).arg(&config_path).status() {
                Ok(s) if s.success() => match Settings::load_from(Some(&config_path)) {
                    Ok(_) => Output::success("Config saved."),
                    Err(e) => Output::warning(&format!("Config saved but does not parse: {}", e)),
                },
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Return a copy of `settings` with the dotted `key` set to `value`.
///
/// `value` is read as a TOML literal when it parses as one (numbers,
/// booleans, arrays), otherwise as a plain string.
fn set_value(settings: &Settings, key: &str, value: &str) -> Result<Settings> {
    let mut root = toml::Value::try_from(settings)?;

    let path: Vec<&str> = key.split('.').collect();
    let (field, sections) = path
        .split_last()
        .ok_or_else(|| anyhow!("Empty configuration key"))?;

    let mut table = root
        .as_table_mut()
        .ok_or_else(|| anyhow!("Configuration is not a table"))?;
    for section in sections {
        table = table
            .get_mut(*section)
            .and_then(toml::Value::as_table_mut)
            .ok_or_else(|| anyhow!("Unknown configuration section '{}'", section))?;
    }

    let parsed = parse_literal(value);
    match table.get(*field) {
        Some(existing) if existing.is_table() => {
            bail!("'{}' is a section; set one of its keys instead", key)
        }
        Some(_) => {}
        // Optional values are omitted when unset.
        None if sections.is_empty() => bail!("Unknown configuration key '{}'", key),
        None => {}
    }
    table.insert(field.to_string(), parsed);

    let updated: Settings = root
        .try_into()
        .map_err(|e| anyhow!("Invalid value for '{}': {}", key, e))?;

    // Unknown keys are dropped by serde; catch them by checking the round trip.
    let check = toml::Value::try_from(&updated)?;
    let mut cursor = Some(&check);
    for part in &path {
        cursor = cursor.and_then(|v| v.get(*part));
    }
    if cursor.is_none() {
        bail!("Unknown configuration key '{}'", key);
    }

    Ok(updated)
}

fn parse_literal(value: &str) -> toml::Value {
    let wrapped = format!("v = {}", value);
    match toml::from_str::<toml::Table>(&wrapped) {
        Ok(mut table) => table
            .remove("v")
            .unwrap_or_else(|| toml::Value::String(value.to_string())),
        Err(_) => toml::Value::String(value.to_string()),
    }
}
