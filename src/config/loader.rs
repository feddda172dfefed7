use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::config::Config;
use crate::error::ConfigError;

/// Environment variable that overrides the configured TMDB key
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Get the application directory (~/.config/ratflix)
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ratflix")
}

/// Get the config file path (~/.config/ratflix/config.toml)
pub fn config_path() -> PathBuf {
    app_dir().join("config.toml")
}

/// Load config from the default path.
///
/// A missing file yields the defaults; `TMDB_API_KEY` wins over the file.
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config = load_config_from(&config_path())?;

    if let Ok(key) = std::env::var(TMDB_API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.tmdb.api_key = key.trim().to_string();
        }
    }

    Ok(config)
}

/// Load config from an explicit path, without environment overrides
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Save config to the default path with secure permissions
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    save_config_to(config, &config_path())
}

/// Save config to an explicit path with secure permissions
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

    fs::write(path, content)?;

    // The file holds an API key
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}
