mod config;
pub mod database;

pub use config::{
    Config, EndpointsConfig, HttpConfig, NotificationsConfig, PrivacyConfig, ProfileConfig,
    ReflectionConfig,
};
pub use database::Database;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/impause[-dev]/` based on IMPAUSE_ENV.
///
/// Set IMPAUSE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("IMPAUSE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("impause-dev")
    } else {
        base_dir.join("impause")
    };

    std::fs::create_dir_all(&dir).map_err(ConfigError::DataDir)?;
    Ok(dir)
}
