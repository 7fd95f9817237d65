//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration, resolving secret references.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate()?;

    println!("Calendars:");
    for calendar in &config.google.calendars {
        if calendar.display_name() == calendar.id {
            println!("  {}", calendar.id);
        } else {
            println!("  {} ({})", calendar.display_name(), calendar.id);
        }
    }
    println!(
        "Weather: {}, {}, {}",
        config.weather.city, config.weather.state, config.weather.country
    );
    println!(
        "Printer: {} at {} baud",
        config.printer.device.display(),
        config.printer.baud_rate
    );
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
