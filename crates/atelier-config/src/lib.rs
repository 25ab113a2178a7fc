//! Configuration module for the atelier workflow system.
//!
//! This module provides structures and utilities for managing workshop
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the atelier service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to the workshop instance.
	pub workshop: WorkshopConfig,
	/// Configuration for the order store backend.
	pub store: StoreConfig,
	/// Configuration for the craftsman directory backend.
	pub directory: DirectoryConfig,
	/// Configuration for the HTTP dispatcher.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the workshop instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkshopConfig {
	/// Unique identifier for this workshop instance.
	pub id: String,
}

/// Configuration for the order store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of store implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the craftsman directory backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of directory implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the HTTP dispatcher is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

/// Returns the default API host of 127.0.0.1 when none is configured.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port of 3000 when none is configured.
fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file with environment variable resolution.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// This method checks that the workshop id is present, that store and
	/// directory both name a primary implementation that is actually
	/// configured, and that an enabled API section binds to a real host.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.workshop.id.is_empty() {
			return Err(ConfigError::Validation(
				"Workshop ID cannot be empty".into(),
			));
		}

		// Validate store config
		if self.store.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one store implementation must be configured".into(),
			));
		}
		if self.store.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Store primary implementation cannot be empty".into(),
			));
		}
		if !self.store.implementations.contains_key(&self.store.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary store '{}' not found in implementations",
				self.store.primary
			)));
		}

		// Validate directory config
		if self.directory.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one directory implementation must be configured".into(),
			));
		}
		if self.directory.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Directory primary implementation cannot be empty".into(),
			));
		}
		if !self
			.directory
			.implementations
			.contains_key(&self.directory.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary directory '{}' not found in implementations",
				self.directory.primary
			)));
		}

		// Validate API config if enabled
		if let Some(ref api) = self.api {
			if api.enabled && api.host.is_empty() {
				return Err(ConfigError::Validation(
					"API host cannot be empty when the API is enabled".into(),
				));
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// Environment variables are resolved and the configuration is automatically
/// validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
