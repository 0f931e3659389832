//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{EventlyError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_storage_config(&settings.storage)?;
    validate_logging_config(&settings.logging)?;
    validate_pagination_config(&settings.pagination)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventlyError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(EventlyError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventlyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(EventlyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventlyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate authentication configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.token_secret.len() < 32 {
        return Err(EventlyError::Config(
            "Token secret must be at least 32 characters".to_string()
        ));
    }

    if config.token_ttl_hours <= 0 {
        return Err(EventlyError::Config(
            "Token TTL must be greater than 0".to_string()
        ));
    }

    if config.bootstrap_admin_email.is_empty() {
        return Err(EventlyError::Config(
            "Bootstrap admin email is required".to_string()
        ));
    }

    Ok(())
}

/// Validate storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.upload_dir.is_empty() {
        return Err(EventlyError::Config(
            "Upload directory is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventlyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventlyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

/// Validate pagination configuration
fn validate_pagination_config(config: &super::PaginationConfig) -> Result<()> {
    if config.events_per_page <= 0 || config.users_per_page <= 0 {
        return Err(EventlyError::Config(
            "Page sizes must be greater than 0".to_string()
        ));
    }

    Ok(())
}
