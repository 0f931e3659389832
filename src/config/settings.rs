//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub pagination: PaginationConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Authentication and bootstrap configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens
    pub token_secret: String,
    pub token_ttl_hours: i64,
    /// Super admin created on first start with an empty users table
    pub bootstrap_admin_email: String,
    pub bootstrap_admin_password: String,
}

/// Blob storage configuration for featured images
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub upload_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

/// Listing page sizes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    pub events_per_page: i64,
    pub users_per_page: i64,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("EVENTLY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EventlyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/evently".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            auth: AuthConfig {
                token_secret: String::new(),
                token_ttl_hours: 24,
                bootstrap_admin_email: "superadmin@school.com".to_string(),
                bootstrap_admin_password: String::new(),
            },
            storage: StorageConfig {
                upload_dir: "./uploads".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "./logs".to_string(),
            },
            pagination: PaginationConfig {
                events_per_page: 12,
                users_per_page: 15,
            },
        }
    }
}
