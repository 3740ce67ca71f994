use std::collections::HashMap;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: String,
    /// Page size used by the list endpoint when `limit` is not given.
    pub default_list_limit: i64,
    pub max_connections: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8000,
            database_path: "app.db".to_string(),
            default_list_limit: 100,
            max_connections: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let host = match env_map.get("HOST") {
            Some(s) => s.parse::<IpAddr>().map_err(|_| {
                ConfigError::InvalidValue("HOST".to_string(), "must be an IP address".to_string())
            })?,
            None => defaults.host,
        };

        let port = match env_map.get("PORT") {
            Some(s) => s.parse::<u16>().map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?,
            None => defaults.port,
        };

        let database_path = env_map
            .get("DATABASE_PATH")
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or(defaults.database_path);

        let default_list_limit = match env_map.get("DEFAULT_LIST_LIMIT") {
            Some(s) => s
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "DEFAULT_LIST_LIMIT".to_string(),
                        "must be a non-negative integer".to_string(),
                    )
                })?,
            None => defaults.default_list_limit,
        };

        let max_connections = match env_map.get("DB_MAX_CONNECTIONS") {
            Some(s) => s
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "DB_MAX_CONNECTIONS".to_string(),
                        "must be a positive integer".to_string(),
                    )
                })?,
            None => defaults.max_connections,
        };

        Ok(Config {
            host,
            port,
            database_path,
            default_list_limit,
            max_connections,
        })
    }
}
