//! Configuration for the ledger confirmation client.
//!
//! Configuration is read from TOML. `${VAR}` and `${VAR:-default}`
//! placeholders are replaced with environment values before parsing, and a
//! top-level `include = [...]` pulls sections from other files.
//!
//! ```toml
//! [client]
//! chain_id = 2
//! retry_delay_ms = 500
//!
//! [transport]
//! primary = "jsonrpc"
//! [transport.implementations.jsonrpc]
//! url = "${LEDGER_RPC_URL:-http://localhost:8080}"
//! ```

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
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
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Client behaviour.
	pub client: ClientConfig,
	/// Transport selection and per-implementation settings.
	pub transport: TransportConfig,
}

/// Settings of the confirmation client itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Chain id every response must report.
	pub chain_id: u8,
	/// Delay between two status queries while waiting on a transaction.
	#[serde(default = "default_retry_delay_ms")]
	pub retry_delay_ms: u64,
	/// Timeout used by callers that do not pass one explicitly.
	#[serde(default = "default_timeout_seconds")]
	pub default_timeout_seconds: u64,
	/// Whether transaction queries ask for events.
	#[serde(default)]
	pub include_events: bool,
}

impl ClientConfig {
	pub fn retry_delay(&self) -> Duration {
		Duration::from_millis(self.retry_delay_ms)
	}

	pub fn default_timeout(&self) -> Duration {
		Duration::from_secs(self.default_timeout_seconds)
	}
}

fn default_retry_delay_ms() -> u64 {
	500
}

fn default_timeout_seconds() -> u64 {
	30
}

/// Transport selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
	/// Which implementation the client uses.
	pub primary: String,
	/// Implementation name to its raw TOML settings.
	pub implementations: HashMap<String, toml::Value>,
}

impl TransportConfig {
	/// Settings of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable VAR_NAME.
/// Supports `${VAR_NAME:-default_value}` syntax for default values.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Checks values serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.client.chain_id == 0 {
			return Err(ConfigError::Validation(
				"client.chain_id must be greater than 0".into(),
			));
		}
		if self.client.retry_delay_ms == 0 {
			return Err(ConfigError::Validation(
				"client.retry_delay_ms must be greater than 0".into(),
			));
		}
		if self.client.default_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"client.default_timeout_seconds must be greater than 0".into(),
			));
		}

		if self.transport.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one transport implementation must be configured".into(),
			));
		}
		if self.transport.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Transport primary implementation cannot be empty".into(),
			));
		}
		if self.transport.primary_config().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary transport '{}' not found in implementations",
				self.transport.primary
			)));
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
