use crate::error::ApiError;
use ::config::Environment;
use serde::Deserialize;
use std::time::Duration;

fn default_pool_max_size() -> u32 {
    4
}

fn default_connection_timeout() -> u64 {
    30
}

/// Environment variables, matched case-insensitively by field name.
#[derive(Deserialize, Debug)]
struct Settings {
    #[serde(default)]
    database_url: String,

    #[serde(default = "default_pool_max_size")]
    database_pool_max_size: u32,

    /// seconds
    #[serde(default = "default_connection_timeout")]
    database_connection_timeout: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub pool_max_size: u32,
    pub connection_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Config, ApiError> {
        Config::from_source(Environment::default())
    }

    fn from_source(environment: Environment) -> Result<Config, ApiError> {
        let settings: Settings = ::config::Config::builder()
            .add_source(environment)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ApiError::StoreUnavailable(format!("Invalid configuration: {}", e)))?;

        if settings.database_url.trim().is_empty() {
            return Err(ApiError::StoreUnavailable("DATABASE_URL must be set".to_string()));
        }
        if settings.database_pool_max_size == 0 {
            return Err(ApiError::StoreUnavailable("DATABASE_POOL_MAX_SIZE must be a positive integer".to_string()));
        }

        Ok(Config {
            database_url: settings.database_url,
            pool_max_size: settings.database_pool_max_size,
            connection_timeout: Duration::from_secs(settings.database_connection_timeout),
        })
    }

    #[cfg(test)]
    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, ApiError> {
        let source: ::config::Map<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_source(Environment::default().source(Some(source)))
    }
}
