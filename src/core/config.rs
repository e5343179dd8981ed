//! Configuration management

use clap::Parser;
use config::{Config as ConfigBuilder, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid catalog configuration: {0}")]
    InvalidCatalog(String),

    #[error("Invalid cache configuration: {0}")]
    InvalidCache(String),

    #[error("Invalid stream configuration: {0}")]
    InvalidStream(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Invalid security configuration: {0}")]
    InvalidSecurity(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    pub stream: StreamConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();

        let mut builder = Self::builder_with_defaults()?;

        // Load from config file if specified
        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(config_path.display().to_string()));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // Environment variables are prefixed with SETLIST_ and use __ for nesting
        // Example: SETLIST_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("SETLIST")
                .separator("__")
                .try_parsing(true),
        );

        // CLI arguments take highest priority
        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(base_url) = &cli_args.catalog_url {
            builder = builder.set_override("catalog.base_url", base_url.clone())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = Self::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from defaults and environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Config = Self::builder_with_defaults()?
            .add_source(
                Environment::with_prefix("SETLIST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn builder_with_defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let builder = ConfigBuilder::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.request_timeout", 30)?
            .set_default("catalog.base_url", "https://api.genius.com")?
            .set_default("catalog.request_timeout", 5)?
            .set_default("catalog.search_retry_attempts", 3)?
            .set_default("catalog.search_backoff_base_ms", 500)?
            .set_default("catalog.page_size", 50)?
            .set_default("catalog.max_pages", 200)?
            .set_default("cache.ttl_seconds", 600)?
            .set_default("stream.retry_attempts", 3)?
            .set_default("stream.retry_delay_ms", 700)?
            .set_default("stream.channel_capacity", 64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("logging.output", "stdout")?
            .set_default("security.allowed_origins", vec!["*"])?
            .set_default("security.rate_limit_requests", 10)?
            .set_default("security.rate_limit_window", 60)?;
        Ok(builder)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.catalog.validate()?;
        self.cache.validate()?;
        self.stream.validate()?;
        self.logging.validate()?;
        self.security.validate()?;
        Ok(())
    }
}

/// Command-line arguments for configuration override
#[derive(Debug, Parser)]
#[command(name = "setlist")]
#[command(about = "Setlist Backend Server", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server host address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Upstream catalog base URL
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // seconds
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer("host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer(
                "port must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidServer(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub request_timeout: u64, // seconds
    pub search_retry_attempts: u32,
    pub search_backoff_base_ms: u64,
    pub page_size: u32,
    pub max_pages: u32,
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url).map_err(|e| {
            ConfigError::InvalidCatalog(format!("base_url is not a valid URL: {}", e))
        })?;

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidCatalog(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.search_retry_attempts == 0 {
            return Err(ConfigError::InvalidCatalog(
                "search_retry_attempts must be greater than 0".to_string(),
            ));
        }

        if self.page_size == 0 || self.page_size > 50 {
            return Err(ConfigError::InvalidCatalog(
                "page_size must be in 1..=50".to_string(),
            ));
        }

        if self.max_pages == 0 {
            return Err(ConfigError::InvalidCatalog(
                "max_pages must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_seconds == 0 {
            return Err(ConfigError::InvalidCache(
                "ttl_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub channel_capacity: usize,
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidStream(
                "retry_attempts must be greater than 0".to_string(),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidStream(
                "channel_capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "level must be one of: {:?}",
                valid_levels
            )));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "format must be one of: {:?}",
                valid_formats
            )));
        }

        let valid_outputs = ["stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "output must be one of: {:?}",
                valid_outputs
            )));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
    pub rate_limit_requests: usize,
    pub rate_limit_window: u64, // seconds
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidSecurity(
                "allowed_origins cannot be empty".to_string(),
            ));
        }

        if self.rate_limit_requests == 0 {
            return Err(ConfigError::InvalidSecurity(
                "rate_limit_requests must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_window == 0 {
            return Err(ConfigError::InvalidSecurity(
                "rate_limit_window must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
