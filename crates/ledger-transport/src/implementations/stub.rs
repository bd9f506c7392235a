//! Scripted in-memory transport.
//!
//! Replies are served from per-method queues. The last reply in a queue is
//! sticky: once the queue holds a single entry it is returned for every
//! further call. Failed attempts can be scripted to simulate an unreachable
//! service, and call counters let callers check how often the service was
//! contacted.

use crate::{TransportError, TransportFactory, TransportInterface, TransportRegistry};
use async_trait::async_trait;
use ledger_types::{
	AccountAddress, ConfigSchema, Field, FieldType, ImplementationRegistry, Metadata,
	ResponseEnvelope, Schema, TransactionRecord, ValidationError,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

type Reply<T> = Result<ResponseEnvelope<T>, String>;

struct ReplyQueue<T> {
	replies: Mutex<VecDeque<Reply<T>>>,
	calls: AtomicUsize,
}

impl<T: Clone> ReplyQueue<T> {
	fn new() -> Self {
		Self {
			replies: Mutex::new(VecDeque::new()),
			calls: AtomicUsize::new(0),
		}
	}

	fn push(&self, reply: Reply<T>) {
		self.replies.lock().push_back(reply);
	}

	fn next(&self, method: &str) -> Result<ResponseEnvelope<T>, TransportError> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let mut replies = self.replies.lock();
		let reply = if replies.len() > 1 {
			replies.pop_front()
		} else {
			replies.front().cloned()
		};

		match reply {
			Some(Ok(envelope)) => Ok(envelope),
			Some(Err(message)) => Err(TransportError::Network(message)),
			None => Err(TransportError::Unavailable(format!(
				"No scripted reply for {}",
				method
			))),
		}
	}
}

/// Transport returning scripted replies.
pub struct StubTransport {
	transactions: ReplyQueue<TransactionRecord>,
	metadata: ReplyQueue<Metadata>,
}

impl Default for StubTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl StubTransport {
	pub fn new() -> Self {
		Self {
			transactions: ReplyQueue::new(),
			metadata: ReplyQueue::new(),
		}
	}

	/// Queues a reply for `get_account_transaction`.
	pub fn with_transaction(self, envelope: ResponseEnvelope<TransactionRecord>) -> Self {
		self.transactions.push(Ok(envelope));
		self
	}

	/// Queues a failed `get_account_transaction` attempt.
	pub fn with_transaction_failure(self, message: impl Into<String>) -> Self {
		self.transactions.push(Err(message.into()));
		self
	}

	/// Queues a reply for `get_metadata`.
	pub fn with_metadata(self, envelope: ResponseEnvelope<Metadata>) -> Self {
		self.metadata.push(Ok(envelope));
		self
	}

	/// Queues a reply for `get_account_transaction` on a shared stub.
	pub fn push_transaction(&self, envelope: ResponseEnvelope<TransactionRecord>) {
		self.transactions.push(Ok(envelope));
	}

	/// Number of `get_account_transaction` calls made so far.
	pub fn transaction_calls(&self) -> usize {
		self.transactions.calls.load(Ordering::SeqCst)
	}

	/// Number of `get_metadata` calls made so far.
	pub fn metadata_calls(&self) -> usize {
		self.metadata.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl TransportInterface for StubTransport {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(StubTransportSchema)
	}

	async fn get_account_transaction(
		&self,
		address: &AccountAddress,
		sequence_number: u64,
		_include_events: bool,
	) -> Result<ResponseEnvelope<TransactionRecord>, TransportError> {
		tracing::trace!(%address, sequence_number, "Stub get_account_transaction");
		self.transactions.next("get_account_transaction")
	}

	async fn get_metadata(&self) -> Result<ResponseEnvelope<Metadata>, TransportError> {
		self.metadata.next("get_metadata")
	}
}

/// Configuration schema for the stub transport.
///
/// All fields are optional; when `chain_id`, `ledger_version` and
/// `ledger_timestamp_usec` are set the stub serves a fixed ledger position.
pub struct StubTransportSchema;

impl ConfigSchema for StubTransportSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let non_negative = || FieldType::Integer {
			min: Some(0),
			max: None,
		};
		let schema = Schema::new(
			vec![],
			vec![
				Field::new(
					"chain_id",
					FieldType::Integer {
						min: Some(1),
						max: Some(u8::MAX as i64),
					},
				),
				Field::new("ledger_version", non_negative()),
				Field::new("ledger_timestamp_usec", non_negative()),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a stub transport from configuration.
///
/// The stub serves the configured ledger position from `get_metadata` and
/// reports every transaction as not yet visible.
pub fn create_stub_transport(
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	StubTransportSchema
		.validate(config)
		.map_err(|e| TransportError::Configuration(format!("Invalid configuration: {}", e)))?;

	let field = |name: &str| config.get(name).and_then(|v| v.as_integer());
	let chain_id = field("chain_id").map(|v| v as u8);
	let version = field("ledger_version").map(|v| v as u64);
	let timestamp = field("ledger_timestamp_usec").map(|v| v as u64);

	let metadata = match (chain_id, version, timestamp) {
		(Some(chain_id), Some(version), Some(timestamp)) => Some(Metadata {
			version,
			timestamp,
			chain_id,
		}),
		_ => None,
	};

	let stub = StubTransport::new()
		.with_metadata(fixed_envelope(chain_id, version, timestamp, metadata))
		.with_transaction(fixed_envelope(chain_id, version, timestamp, None));
	Ok(Box::new(stub))
}

fn fixed_envelope<T>(
	chain_id: Option<u8>,
	version: Option<u64>,
	timestamp: Option<u64>,
	result: Option<T>,
) -> ResponseEnvelope<T> {
	ResponseEnvelope {
		chain_id,
		ledger_version: version,
		ledger_timestamp_usec: timestamp,
		..ResponseEnvelope::with_result(result)
	}
}

/// Registry for the stub transport.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "stub";
	type Factory = TransportFactory;

	fn factory() -> Self::Factory {
		create_stub_transport
	}
}

impl TransportRegistry for Registry {}
