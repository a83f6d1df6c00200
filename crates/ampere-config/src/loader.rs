//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator};
use ampere_core::AmpereError;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use tracing::{debug, info};

/// Loads configuration from the default location (`./config`).
pub fn load_default() -> Result<AppConfig, AmpereError> {
    load("./config")
}

/// Loads configuration from the specified directory.
///
/// Sources are merged in order:
/// 1. `{config_dir}/default.toml` - Default values
/// 2. `{config_dir}/{environment}.toml` - Environment-specific overrides
/// 3. `{config_dir}/local.toml` - Local overrides (not committed)
/// 4. Environment variables with `AMPERE_` prefix (`__` separator)
pub fn load(config_dir: &str) -> Result<AppConfig, AmpereError> {
    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file found or error loading it: {}", e);
    }

    let environment =
        std::env::var("AMPERE_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    info!("Loading configuration for environment: {}", environment);

    let mut builder = Config::builder();

    // 1. Load default configuration
    let default_path = format!("{}/default.toml", config_dir);
    if Path::new(&default_path).exists() {
        debug!("Loading default config from: {}", default_path);
        builder = builder.add_source(File::with_name(&default_path).required(false));
    }

    // 2. Load environment-specific configuration
    let env_path = format!("{}/{}.toml", config_dir, environment);
    if Path::new(&env_path).exists() {
        debug!("Loading environment config from: {}", env_path);
        builder = builder.add_source(File::with_name(&env_path).required(false));
    }

    // 3. Load local overrides (not committed to version control)
    let local_path = format!("{}/local.toml", config_dir);
    if Path::new(&local_path).exists() {
        debug!("Loading local config from: {}", local_path);
        builder = builder.add_source(File::with_name(&local_path).required(false));
    }

    // 4. Override with environment variables (AMPERE_ prefix)
    builder = builder.add_source(
        Environment::with_prefix("AMPERE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build().map_err(config_error_to_ampere_error)?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(config_error_to_ampere_error)?;

    // Fail fast on invalid configuration
    ConfigValidator::validate(&app_config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        AmpereError::Configuration(messages.join("; "))
    })?;

    Ok(app_config)
}

fn config_error_to_ampere_error(err: ConfigError) -> AmpereError {
    AmpereError::Configuration(err.to_string())
}
