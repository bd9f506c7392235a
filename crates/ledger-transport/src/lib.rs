//! Transport layer for talking to the ledger service.
//!
//! This crate defines the narrow RPC boundary the confirmation client relies
//! on: fetch a transaction by sender and sequence number, and fetch the
//! service's current metadata. Every reply comes back as a
//! [`ResponseEnvelope`] carrying the chain id and ledger position next to the
//! payload, so callers can validate the reply before interpreting it.

use async_trait::async_trait;
use ledger_types::{
	AccountAddress, ConfigSchema, ImplementationRegistry, Metadata, ResponseEnvelope,
	TransactionRecord,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod jsonrpc;
	pub mod stub;
}

/// Errors that can occur while performing a single RPC call.
///
/// All of these describe a failed attempt, not a statement about the
/// transaction; the confirmation poller treats them as transient.
#[derive(Debug, Error)]
pub enum TransportError {
	/// The request could not be sent or the connection failed.
	#[error("Network error: {0}")]
	Network(String),
	/// The service answered with a non-success HTTP status.
	#[error("HTTP status {status}: {body}")]
	Http { status: u16, body: String },
	/// The reply could not be decoded.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The transport was configured incorrectly.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// No reply is available, for example from an unscripted stub.
	#[error("Unavailable: {0}")]
	Unavailable(String),
}

/// Interface every transport implementation provides.
#[async_trait]
pub trait TransportInterface: Send + Sync {
	/// Returns the configuration schema for this transport implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Fetches the transaction sent by `address` with `sequence_number`.
	///
	/// The envelope's result is `None` while the transaction is not yet
	/// visible to the service.
	async fn get_account_transaction(
		&self,
		address: &AccountAddress,
		sequence_number: u64,
		include_events: bool,
	) -> Result<ResponseEnvelope<TransactionRecord>, TransportError>;

	/// Fetches the service's latest ledger metadata.
	async fn get_metadata(&self) -> Result<ResponseEnvelope<Metadata>, TransportError>;
}

/// Type alias for transport factory functions.
pub type TransportFactory = fn(&toml::Value) -> Result<Box<dyn TransportInterface>, TransportError>;

/// Registry trait for transport implementations.
pub trait TransportRegistry: ImplementationRegistry<Factory = TransportFactory> {}

/// Get all registered transport implementations.
///
/// Returns a vector of (name, factory) tuples for all available transports.
pub fn get_all_implementations() -> Vec<(&'static str, TransportFactory)> {
	use implementations::{jsonrpc, stub};

	vec![
		(jsonrpc::Registry::NAME, jsonrpc::Registry::factory()),
		(stub::Registry::NAME, stub::Registry::factory()),
	]
}

/// Builds the implementation registered under `name`.
pub fn create_transport(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	let factory = get_all_implementations()
		.into_iter()
		.find(|(registered, _)| *registered == name)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			TransportError::Configuration(format!("Unknown transport implementation '{}'", name))
		})?;

	factory(config)
}
