//! Global configuration loader for Lumina.
//!
//! Reads `config.toml` from the data directory (`~/.lumina/` in production)
//! and deserializes it into [`LuminaConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use lumina_types::config::LuminaConfig;
use secrecy::SecretString;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Dotenv file read from the working directory at startup.
pub const ENV_FILE: &str = ".env";

/// Load `KEY=value` pairs from `path` into the process environment.
///
/// Variables already set in the environment win. A missing or malformed file
/// is only a warning; returns whether the file was applied.
pub fn load_env_file(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!("Loaded environment from {}", path.display());
            true
        }
        Err(err) => {
            tracing::warn!("Error loading {} file: {err}", path.display());
            false
        }
    }
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults.
/// - Unreadable or unparsable file: a warning, then defaults.
pub async fn load_config(data_dir: &Path) -> LuminaConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return LuminaConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return LuminaConfig::default();
        }
    };

    match toml::from_str::<LuminaConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            LuminaConfig::default()
        }
    }
}

/// Read the API key from the environment variable `var`.
///
/// An unset or empty variable yields `None` with a warning; the generator
/// then fails every call with an authentication error.
pub fn api_key_from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Some(SecretString::from(key)),
        _ => {
            tracing::warn!("{var} environment variable not set");
            None
        }
    }
}
