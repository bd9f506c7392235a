//! Client facade over the transport, tracker and poller.

use crate::decode::{BcsTransactionDecoder, TransactionDecoder};
use crate::error::{outcome_into_result, ClientError};
use crate::poller::ConfirmationPoller;
use crate::resolver::{IdentityResolver, SignedTransactionHex};
use crate::tracker::LedgerStateTracker;
use crate::validator::ResponseValidator;
use ledger_config::Config;
use ledger_transport::{TransportError, TransportInterface};
use ledger_types::{
	AccountAddress, LedgerState, Metadata, PendingTransaction, ResponseEnvelope,
	TransactionRecord,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for querying the ledger and waiting on submitted transactions.
///
/// Clones share the transport and the ledger state tracker, so staleness is
/// detected across every call made through any clone.
#[derive(Clone)]
pub struct LedgerClient {
	chain_id: u8,
	transport: Arc<dyn TransportInterface>,
	tracker: Arc<LedgerStateTracker>,
	decoder: Arc<dyn TransactionDecoder>,
	retry_delay: Duration,
	default_timeout: Duration,
	include_events: bool,
}

impl LedgerClient {
	pub fn new(chain_id: u8, transport: Arc<dyn TransportInterface>) -> Self {
		Self {
			chain_id,
			transport,
			tracker: Arc::new(LedgerStateTracker::new()),
			decoder: Arc::new(BcsTransactionDecoder),
			retry_delay: DEFAULT_RETRY_DELAY,
			default_timeout: DEFAULT_TIMEOUT,
			include_events: false,
		}
	}

	/// Builds a client using the configured primary transport.
	pub fn from_config(config: &Config) -> Result<Self, ClientError> {
		let name = &config.transport.primary;
		let transport_config = config.transport.primary_config().ok_or_else(|| {
			ClientError::Configuration(format!("Primary transport '{}' is not configured", name))
		})?;

		let transport = ledger_transport::create_transport(name, transport_config).map_err(|e| {
			ClientError::Configuration(format!("Failed to create transport '{}': {}", name, e))
		})?;
		tracing::info!(component = "transport", implementation = %name, "Loaded");

		Ok(Self::new(config.client.chain_id, Arc::from(transport))
			.with_retry_delay(config.client.retry_delay())
			.with_default_timeout(config.client.default_timeout())
			.with_include_events(config.client.include_events))
	}

	/// Delay between two lookups while waiting.
	pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
		self.retry_delay = retry_delay;
		self
	}

	/// Timeout used by [`LedgerClient::wait_for_pending`].
	pub fn with_default_timeout(mut self, default_timeout: Duration) -> Self {
		self.default_timeout = default_timeout;
		self
	}

	pub fn with_decoder(mut self, decoder: Arc<dyn TransactionDecoder>) -> Self {
		self.decoder = decoder;
		self
	}

	/// Whether waits ask for the transaction's events.
	pub fn with_include_events(mut self, include_events: bool) -> Self {
		self.include_events = include_events;
		self
	}

	pub fn chain_id(&self) -> u8 {
		self.chain_id
	}

	pub fn retry_delay(&self) -> Duration {
		self.retry_delay
	}

	pub fn default_timeout(&self) -> Duration {
		self.default_timeout
	}

	/// Latest ledger position seen in any response.
	pub fn last_response_ledger_state(&self) -> LedgerState {
		self.tracker.current()
	}

	/// Overrides the tracked ledger position.
	pub fn update_last_response_ledger_state(&self, state: LedgerState) {
		self.tracker.set(state);
	}

	/// Fetches the service's latest metadata.
	pub async fn get_metadata(&self) -> Result<Metadata, ClientError> {
		let envelope = self.transport.get_metadata().await?;
		self.checked(envelope)?
			.ok_or_else(|| TransportError::Decode("get_metadata returned no result".into()).into())
	}

	/// Fetches a transaction by sender and sequence number.
	///
	/// Returns `None` while the service does not know the transaction.
	pub async fn get_account_transaction(
		&self,
		address: &AccountAddress,
		sequence_number: u64,
		include_events: bool,
	) -> Result<Option<TransactionRecord>, ClientError> {
		let envelope = self
			.transport
			.get_account_transaction(address, sequence_number, include_events)
			.await?;
		self.checked(envelope)
	}

	/// Waits for a transaction until `timeout` elapses.
	pub async fn wait_for_transaction(
		&self,
		address: AccountAddress,
		sequence_number: u64,
		hash: &str,
		expiration_timestamp_secs: u64,
		timeout: Duration,
	) -> Result<TransactionRecord, ClientError> {
		let pending = PendingTransaction {
			sender: address,
			sequence_number,
			hash: hash.to_string(),
			expiration_timestamp_secs,
		};
		self.wait_for_transaction_until(&pending, Instant::now() + timeout)
			.await
	}

	/// Waits for a transaction for the client's default timeout.
	pub async fn wait_for_pending(
		&self,
		pending: &PendingTransaction,
	) -> Result<TransactionRecord, ClientError> {
		self.wait_for_transaction_until(pending, Instant::now() + self.default_timeout)
			.await
	}

	/// Waits for a transaction until `deadline`.
	pub async fn wait_for_transaction_until(
		&self,
		pending: &PendingTransaction,
		deadline: Instant,
	) -> Result<TransactionRecord, ClientError> {
		self.wait(pending, deadline).await
	}

	/// Decodes a hex encoded signed transaction and waits for it.
	///
	/// Decode failures are returned before the service is queried.
	pub async fn wait_for_signed_transaction(
		&self,
		signed_txn_hex: &str,
		timeout: Duration,
	) -> Result<TransactionRecord, ClientError> {
		let resolver = SignedTransactionHex::new(signed_txn_hex, self.decoder.as_ref());
		self.wait(&resolver, Instant::now() + timeout).await
	}

	async fn wait<R>(&self, resolver: &R, deadline: Instant) -> Result<TransactionRecord, ClientError>
	where
		R: IdentityResolver + ?Sized,
	{
		let outcome = self.poller().wait(resolver, deadline).await?;
		outcome_into_result(outcome)
	}

	fn poller(&self) -> ConfirmationPoller {
		ConfirmationPoller::new(
			Arc::clone(&self.transport),
			self.validator(),
			self.retry_delay,
		)
		.with_include_events(self.include_events)
	}

	fn validator(&self) -> ResponseValidator {
		ResponseValidator::new(self.chain_id, Arc::clone(&self.tracker))
	}

	/// Validates a single response and unwraps its result.
	fn checked<T>(&self, envelope: ResponseEnvelope<T>) -> Result<Option<T>, ClientError> {
		self.validator().validate(&envelope)?;
		if let Some(error) = envelope.error {
			return Err(ClientError::Rpc(error));
		}
		if let Some(reason) = envelope.result_error {
			return Err(TransportError::Decode(reason).into());
		}
		Ok(envelope.result)
	}
}
