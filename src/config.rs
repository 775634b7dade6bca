//! Configuration management for simbld_accounts
//!
//! Settings are layered from serde defaults, an optional `config/default.toml`, and
//! environment variables prefixed with `APP__` (for example `APP__SERVER__PORT=9090`).

use crate::types::StartupError;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "config/default";
const ENV_PREFIX: &str = "APP";

/// Complete app configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
    pub auth: AuthConfig,
    pub log_level: LogLevel,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub keep_alive_secs: u64,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            keep_alive_secs: 30,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Which store backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub max_connections: usize,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "simbld_accounts".to_string(),
            max_connections: 16,
            connect_timeout_secs: 5,
        }
    }
}

/// Avatar upload settings, owned by the photo processor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub public_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public/img/users"),
            width: 349,
            height: 708,
            quality: 90,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Bearer token settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change_me_in_production".to_string(),
            token_ttl_minutes: 60,
        }
    }
}

/// Log level used when `RUST_LOG` is not set
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct LogLevel(pub String);

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel("info".to_string())
    }
}

/// Load complete app configuration
pub fn load_config() -> Result<AppConfig, StartupError> {
    dotenvy::dotenv().ok();

    let config: AppConfig = config::Config::builder()
        .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    validate_config(&config)?;
    Ok(config)
}

/// Reject settings the service cannot run with
pub fn validate_config(config: &AppConfig) -> Result<(), StartupError> {
    if config.auth.jwt_secret.trim().is_empty() {
        return Err(StartupError::Config("JWT secret can't be empty".to_string()));
    }

    if config.upload.width == 0 || config.upload.height == 0 {
        return Err(StartupError::Config("Upload dimensions must be non-zero".to_string()));
    }

    if !(1..=100).contains(&config.upload.quality) {
        return Err(StartupError::Config("JPEG quality must be between 1 and 100".to_string()));
    }

    if config.upload.max_bytes == 0 {
        return Err(StartupError::Config("Upload size limit must be non-zero".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.upload.width, 349);
        assert_eq!(config.upload.height, 708);
        assert_eq!(config.upload.quality, 90);
        assert_eq!(config.upload.public_dir, PathBuf::from("public/img/users"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "  ".to_string();
        assert!(matches!(validate_config(&config), Err(StartupError::Config(_))));
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.upload.quality = 0;
        assert!(validate_config(&config).is_err());

        config.upload.quality = 101;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let backend: StorageBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StorageBackend::Memory);
    }
}
