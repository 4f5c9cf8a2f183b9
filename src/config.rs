//! Configuration management for taskdesk.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `4000`.
//! - `DATA_DIR` - Optional. Directory for the file and SQLite stores. Defaults to `./data`.
//! - `TASK_STORE` - Optional. `memory`, `file` or `sqlite`. Defaults to `sqlite`.
//! - `JWT_SECRET` - Required unless `DEV_MODE` is set. HMAC secret for session tokens.
//! - `JWT_TTL_DAYS` - Optional. Token lifetime in days. Defaults to `7`.
//! - `PASSWORD_HASH_ITERATIONS` - Optional. PBKDF2 rounds. Defaults to `100000`.
//! - `DEV_MODE` - Optional. Uses a fixed development JWT secret when `JWT_SECRET` is unset.

use std::path::PathBuf;
use thiserror::Error;

use crate::account::DEFAULT_ITERATIONS;
use crate::store::StoreType;
use crate::util::parse_bool_flag;

/// Secret used in dev mode when `JWT_SECRET` is not provided.
const DEV_JWT_SECRET: &str = "taskdesk-dev-secret-do-not-use-in-production";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Session token settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing JWTs
    pub jwt_secret: String,

    /// Token lifetime in days
    pub jwt_ttl_days: i64,

    /// PBKDF2 iteration count for new password hashes
    pub password_iterations: u32,

    /// True when `jwt_secret` is the built-in development secret
    pub using_dev_secret: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_days: 7,
            password_iterations: DEFAULT_ITERATIONS,
            using_dev_secret: true,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Directory for persistent stores
    pub data_dir: PathBuf,

    /// Storage backend
    pub store_type: StoreType,

    /// Development mode
    pub dev_mode: bool,

    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `JWT_SECRET` is not set outside
    /// dev mode, and `ConfigError::InvalidValue` for unparsable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = parse_var(var("PORT"), "PORT", 4000u16)?;

        let data_dir = var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let store_type = match var("TASK_STORE") {
            Some(raw) => StoreType::parse(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("TASK_STORE".to_string(), raw))?,
            None => StoreType::default(),
        };

        let dev_mode = match var("DEV_MODE") {
            Some(raw) => parse_bool_flag(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("DEV_MODE".to_string(), raw))?,
            None => false,
        };

        let (jwt_secret, using_dev_secret) = match var("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if dev_mode => (DEV_JWT_SECRET.to_string(), true),
            None => return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string())),
        };

        let jwt_ttl_days = parse_var(var("JWT_TTL_DAYS"), "JWT_TTL_DAYS", 7i64)?;
        if jwt_ttl_days < 1 {
            return Err(ConfigError::InvalidValue(
                "JWT_TTL_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let password_iterations = parse_var(
            var("PASSWORD_HASH_ITERATIONS"),
            "PASSWORD_HASH_ITERATIONS",
            DEFAULT_ITERATIONS,
        )?;
        if password_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "PASSWORD_HASH_ITERATIONS".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            data_dir,
            store_type,
            dev_mode,
            auth: AuthConfig {
                jwt_secret,
                jwt_ttl_days,
                password_iterations,
                using_dev_secret,
            },
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(data_dir: PathBuf, store_type: StoreType) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            data_dir,
            store_type,
            dev_mode: true,
            auth: AuthConfig::default(),
        }
    }
}

fn parse_var<T>(raw: Option<String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults_with_secret() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4000);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.store_type, StoreType::Sqlite);
        assert!(!config.dev_mode);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.jwt_ttl_days, 7);
        assert!(!config.auth.using_dev_secret);
    }

    #[test]
    fn test_secret_required_outside_dev_mode() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::MissingEnvVar(name)) if name == "JWT_SECRET"
        ));

        let dev = load(&[("DEV_MODE", "true")]).unwrap();
        assert!(dev.dev_mode);
        assert!(dev.auth.using_dev_secret);
        assert_eq!(dev.auth.jwt_secret, DEV_JWT_SECRET);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("JWT_SECRET", "x"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("DATA_DIR", "/var/lib/taskdesk"),
            ("TASK_STORE", "memory"),
            ("JWT_TTL_DAYS", "30"),
            ("PASSWORD_HASH_ITERATIONS", "1000"),
        ])
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/taskdesk"));
        assert_eq!(config.store_type, StoreType::Memory);
        assert_eq!(config.auth.jwt_ttl_days, 30);
        assert_eq!(config.auth.password_iterations, 1000);
    }

    #[test]
    fn test_invalid_values() {
        for vars in [
            vec![("JWT_SECRET", "x"), ("PORT", "http")],
            vec![("JWT_SECRET", "x"), ("TASK_STORE", "postgres")],
            vec![("JWT_SECRET", "x"), ("JWT_TTL_DAYS", "0")],
            vec![("JWT_SECRET", "x"), ("DEV_MODE", "maybe")],
            vec![("JWT_SECRET", "x"), ("PASSWORD_HASH_ITERATIONS", "0")],
        ] {
            assert!(
                matches!(load(&vars), Err(ConfigError::InvalidValue(..))),
                "expected InvalidValue for {:?}",
                vars
            );
        }
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("JWT_SECRET", "x"), ("PORT", "  "), ("TASK_STORE", "")]).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.store_type, StoreType::Sqlite);
    }
}
