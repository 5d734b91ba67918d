use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::env;
use config;

pub const DEFAULT_MUX_API_BASE: &str = "https://api.mux.com";
pub const DEFAULT_PRINCIPAL_HEADER: &str = "X-Principal-Id";

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VideoConfig {
    pub api_base: String,
    pub token_id: String,
    pub token_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    pub video: VideoConfig,
    // Populated from the .env file
    pub database_path: String,
    pub allowed_origins: String,
    pub log_level: String,
    pub principal_header: String,
    pub trusted_gateway_ips: String,
}

fn missing(key: &str) -> config::ConfigError {
    config::ConfigError::Message(format!(
        "FATAL: Environment variable '{}' is not set in your .env file.", key
    ))
}

impl Config {
    /// Loads the given .env file into the process environment, then builds the config from it.
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path)
            .map_err(|e| config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}", env_path.display(), e
            )))?;

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("DATABASE_PATH").ok_or_else(|| missing("DATABASE_PATH"))?;
        let token_id = lookup("MUX_TOKEN_ID").ok_or_else(|| missing("MUX_TOKEN_ID"))?;
        let token_secret = lookup("MUX_TOKEN_SECRET").ok_or_else(|| missing("MUX_TOKEN_SECRET"))?;

        if token_id.trim().is_empty() || token_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "FATAL: 'MUX_TOKEN_ID' and 'MUX_TOKEN_SECRET' must not be empty.".to_string()
            ));
        }

        let api_base = lookup("MUX_API_BASE")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MUX_API_BASE.to_string());

        let allowed_origins = lookup("ALLOWED_ORIGINS").unwrap_or_default();
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let principal_header = lookup("PRINCIPAL_HEADER")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PRINCIPAL_HEADER.to_string());

        if !principal_header.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(config::ConfigError::Message(format!(
                "FATAL: 'PRINCIPAL_HEADER' ('{}') is not a valid header name.", principal_header
            )));
        }

        // Empty means no gateway is trusted and every request is unauthenticated.
        let trusted_gateway_ips = lookup("TRUSTED_GATEWAY_IPS").unwrap_or_default();

        if Path::new(&database_path).is_relative() {
            return Err(config::ConfigError::Message(format!(
                "FATAL: The 'DATABASE_PATH' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
                database_path
            )));
        }

        let builder = config::Config::builder()
            // Web host/port come from the TOML file.
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml))
            .set_override("database_path", database_path)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .set_override("principal_header", principal_header)?
            .set_override("trusted_gateway_ips", trusted_gateway_ips)?
            .set_override("video.api_base", api_base)?
            .set_override("video.token_id", token_id)?
            .set_override("video.token_secret", token_secret)?
            .build()?;

        builder.try_deserialize()
    }

    /// Returns the full path to the courses database file inside its own folder.
    pub fn courses_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("courses")
            .join("courses.db")
    }

    pub fn trusts_gateway(&self, peer_ip: &str) -> bool {
        let trusted = self.trusted_gateway_ips.trim();
        if trusted == "*" {
            return true;
        }
        trusted.split(',').map(|ip| ip.trim()).any(|ip| !ip.is_empty() && ip == peer_ip)
    }
}
