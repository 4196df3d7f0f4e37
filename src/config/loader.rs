//! Load config from a JSON file or from the environment.

use crate::config::types::{default_bind, default_max_connections, DatabaseConfig};
use crate::config::{validate, AppConfig};
use crate::error::ConfigError;
use crate::store::DEFAULT_DATABASE;
use std::path::Path;

/// Env var naming a JSON config file; when set, `load` reads it instead of the plain env vars.
pub const CONFIG_PATH_VAR: &str = "WAYPOINT_CONFIG";

/// Parse and validate JSON config text.
pub fn parse(json: &str) -> Result<AppConfig, ConfigError> {
    let config = decode(json)?;
    validate(&config)?;
    Ok(config)
}

fn decode(json: &str) -> Result<AppConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

async fn read(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    parse(&read(path.as_ref()).await?)
}

/// Adds `url` as the `default` database unless config already defines one.
fn with_default_database(mut config: AppConfig, url: Option<String>) -> AppConfig {
    if let (false, Some(url)) = (config.databases.contains_key(DEFAULT_DATABASE), url) {
        config.databases.insert(
            DEFAULT_DATABASE.to_string(),
            DatabaseConfig {
                url,
                max_connections: default_max_connections(),
            },
        );
    }
    config
}

/// Config from env (after `.env`): `DATABASE_URL` becomes the `default` database,
/// `BIND_ADDR` the listen address, `WAYPOINT_DEBUG` the debug flag. No routes or models.
pub fn from_env() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    let mut config = with_default_database(AppConfig::default(), std::env::var("DATABASE_URL").ok());
    config.server.bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| default_bind());
    config.debug = std::env::var("WAYPOINT_DEBUG")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    validate(&config)?;
    Ok(config)
}

/// File named by `WAYPOINT_CONFIG` if set, env otherwise. A `DATABASE_URL` in env
/// fills in the `default` database when the file does not define one; validation
/// runs on the merged result.
pub async fn load() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => {
            let config = decode(&read(Path::new(&path)).await?)?;
            let config = with_default_database(config, std::env::var("DATABASE_URL").ok());
            validate(&config)?;
            Ok(config)
        }
        Err(_) => from_env(),
    }
}
