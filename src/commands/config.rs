//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value
//! - `config path`: Print the config file location

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{API_URL_ENV, Config, USER_ENV, VALID_KEYS};
use crate::error::{DiscoveryError, Result};

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    let mut values = serde_json::Map::new();
    for key in VALID_KEYS {
        values.insert((*key).to_string(), json!(config.get(key)?));
    }

    let json_output = json!({
        "config": values,
        "effective": {
            "api_url": config.api_url(),
            "user": config.user(),
        },
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text = format!("{}\n\n", "Configuration:".cyan().bold());
    for key in VALID_KEYS {
        text.push_str(&format!("{}: {}\n", key.cyan(), config.get(key)?));
    }

    for (env_name, key, effective) in [
        (API_URL_ENV, "api_url", config.api_url()),
        (USER_ENV, "user", config.user()),
    ] {
        if effective != config.get(key)? {
            text.push_str(&format!(
                "{}\n",
                format!("{key} overridden by {env_name}: {effective}").yellow()
            ));
        }
    }

    text.push('\n');
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str) -> Result<()> {
    if !VALID_KEYS.contains(&key) {
        return Err(DiscoveryError::Config(format!(
            "invalid config key '{key}'. Valid keys: {}",
            VALID_KEYS.join(", ")
        )));
    }

    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("Set {} to {}", key.cyan(), config.get(key)?);
    Ok(())
}

/// Print the config file path
pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path().display());
    Ok(())
}
