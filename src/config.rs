//! Server configuration from environment variables.

use crate::error::ConfigError;
use regex::Regex;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub db_schema: String,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            db_schema: DEFAULT_SCHEMA.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

fn parse_setting<T: std::str::FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}

impl ServerConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset or empty keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = ServerConfig::default();

        if let Some(raw) = get("BIND_ADDR") {
            config.bind_addr = parse_setting("BIND_ADDR", raw)?;
        }
        config.database_url = get("DATABASE_URL");
        if let Some(raw) = get("DB_MAX_CONNECTIONS") {
            config.max_connections = parse_setting("DB_MAX_CONNECTIONS", raw)?;
            if config.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    key: "DB_MAX_CONNECTIONS",
                    value: "0".into(),
                    reason: "must be at least 1".into(),
                });
            }
        }
        if let Some(raw) = get("DB_SCHEMA") {
            let re = Regex::new(IDENTIFIER_PATTERN).map_err(|e| ConfigError::Invalid {
                key: "DB_SCHEMA",
                value: raw.clone(),
                reason: e.to_string(),
            })?;
            if !re.is_match(&raw) {
                return Err(ConfigError::Invalid {
                    key: "DB_SCHEMA",
                    value: raw,
                    reason: "must be a plain SQL identifier".into(),
                });
            }
            config.db_schema = raw;
        }
        if let Some(raw) = get("BODY_LIMIT_BYTES") {
            config.body_limit = parse_setting("BODY_LIMIT_BYTES", raw)?;
        }
        tracing::debug!(?config, "server config");
        Ok(config)
    }
}
