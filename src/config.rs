//! Configuration management for the WerTigo service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WertigoError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the WerTigo service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WertigoConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Chat assistant configuration
    #[serde(default)]
    pub chat: ChatConfig,
    /// Map viewport configuration
    #[serde(default)]
    pub map: MapConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// Allow cross-origin requests from any origin
    #[serde(default = "default_cors_allow_any")]
    pub cors_allow_any: bool,
}

/// Catalog source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON catalog file; the embedded catalog is used when unset
    pub path: Option<PathBuf>,
}

/// Chat assistant settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Shortest simulated reply delay in milliseconds
    #[serde(default = "default_min_reply_delay")]
    pub min_reply_delay_ms: u64,
    /// Longest simulated reply delay in milliseconds
    #[serde(default = "default_max_reply_delay")]
    pub max_reply_delay_ms: u64,
    /// Idle seconds after which a chat session is discarded
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

/// Map viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Latitude of the country-level center
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,
    /// Longitude of the country-level center
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,
    /// Zoom level without a selected city
    #[serde(default = "default_overview_zoom")]
    pub overview_zoom: u8,
    /// Zoom level when a city is selected
    #[serde(default = "default_city_zoom")]
    pub city_zoom: u8,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    30
}

fn default_cors_allow_any() -> bool {
    true
}

fn default_min_reply_delay() -> u64 {
    1000
}

fn default_max_reply_delay() -> u64 {
    2000
}

fn default_session_ttl() -> u64 {
    1800
}

fn default_center_latitude() -> f64 {
    12.8797
}

fn default_center_longitude() -> f64 {
    121.7740
}

fn default_overview_zoom() -> u8 {
    6
}

fn default_city_zoom() -> u8 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
            cors_allow_any: default_cors_allow_any(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            min_reply_delay_ms: default_min_reply_delay(),
            max_reply_delay_ms: default_max_reply_delay(),
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            overview_zoom: default_overview_zoom(),
            city_zoom: default_city_zoom(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ServerConfig {
    /// Socket address string to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.into())
    }
}

impl ChatConfig {
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }
}

impl WertigoConfig {
    /// Load configuration from `config_path`, the user config dir or
    /// `config.toml`, then apply `WERTIGO_*` environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides, e.g. WERTIGO_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("WERTIGO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WertigoConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wertigo").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.chat.session_ttl_seconds == 0 {
            self.chat.session_ttl_seconds = default_session_ttl();
        }
        if self.map.overview_zoom == 0 {
            self.map.overview_zoom = default_overview_zoom();
        }
        if self.map.city_zoom == 0 {
            self.map.city_zoom = default_city_zoom();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.request_timeout_seconds > 300 {
            return Err(WertigoError::config("Request timeout cannot exceed 300 seconds").into());
        }

        if self.chat.max_reply_delay_ms > 60_000 {
            return Err(WertigoError::config("Chat reply delay cannot exceed 60000 ms").into());
        }

        if self.chat.min_reply_delay_ms > self.chat.max_reply_delay_ms {
            return Err(WertigoError::config(
                "Chat min_reply_delay_ms cannot exceed max_reply_delay_ms",
            )
            .into());
        }

        if self.chat.session_ttl_seconds > 86_400 {
            return Err(
                WertigoError::config("Chat session TTL cannot exceed 86400 seconds").into(),
            );
        }

        if !(-90.0..=90.0).contains(&self.map.center_latitude)
            || !(-180.0..=180.0).contains(&self.map.center_longitude)
        {
            return Err(
                WertigoError::config("Map center must be a valid latitude/longitude").into(),
            );
        }

        let zooms = [
            ("overview_zoom", self.map.overview_zoom),
            ("city_zoom", self.map.city_zoom),
        ];
        for (name, zoom) in zooms {
            if !(1..=20).contains(&zoom) {
                return Err(WertigoError::config(format!(
                    "Map {name} must be between 1 and 20, got {zoom}"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WertigoError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WertigoError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WertigoConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_seconds, 30);
        assert_eq!(config.chat.min_reply_delay_ms, 1000);
        assert_eq!(config.chat.max_reply_delay_ms, 2000);
        assert_eq!(config.map.overview_zoom, 6);
        assert_eq!(config.map.city_zoom, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.catalog.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WertigoConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WertigoConfig::default();
        config.server.request_timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_reply_delay_order() {
        let mut config = WertigoConfig::default();
        config.chat.min_reply_delay_ms = 3000;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("min_reply_delay_ms"));
    }

    #[test]
    fn test_config_validation_zoom() {
        let mut config = WertigoConfig::default();
        config.map.city_zoom = 25;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("city_zoom"));
    }

    #[test]
    fn test_session_ttl() {
        let mut config = WertigoConfig::default();
        assert_eq!(config.chat.session_ttl(), Duration::from_secs(1800));

        config.chat.session_ttl_seconds = 100_000;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("session TTL"));

        config.chat.session_ttl_seconds = 0;
        config.apply_defaults();
        assert_eq!(config.chat.session_ttl_seconds, 1800);
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = WertigoConfig::default();
        config.logging.format = String::new();
        config.server.request_timeout_seconds = 0;
        config.apply_defaults();
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.server.request_timeout_seconds, 30);
    }

    #[test]
    fn test_load_from_toml_file() {
        let path =
            std::env::temp_dir().join(format!("wertigo-config-{}.toml", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(
                file,
                "[server]\nport = 9090\n\n[chat]\nmin_reply_delay_ms = 0\nmax_reply_delay_ms = 10"
            )
            .unwrap();
        }

        let config = WertigoConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.chat.max_reply_delay_ms, 10);
        assert_eq!(config.map.city_zoom, 10);
    }

    #[test]
    fn test_bind_address() {
        let config = WertigoConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WertigoConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("wertigo"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
