//! Polling for the fate of a submitted transaction.
//!
//! Queries the service at a fixed interval until the transaction is
//! confirmed, fails, turns out to be a different transaction, expires by
//! the ledger's clock, or the caller's deadline passes. Every response is
//! validated before it is interpreted; a validation failure ends the wait.

use crate::expiration::is_expired;
use crate::interpreter::{interpret, IterationResult};
use crate::resolver::IdentityResolver;
use crate::validator::ResponseValidator;
use crate::ClientError;
use ledger_transport::TransportInterface;
use ledger_types::{truncate_id, PendingTransaction, PollOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::instrument;

/// Runs the confirmation loop for one client.
pub struct ConfirmationPoller {
	transport: Arc<dyn TransportInterface>,
	validator: ResponseValidator,
	retry_delay: Duration,
	include_events: bool,
}

impl ConfirmationPoller {
	pub fn new(
		transport: Arc<dyn TransportInterface>,
		validator: ResponseValidator,
		retry_delay: Duration,
	) -> Self {
		Self {
			transport,
			validator,
			retry_delay,
			include_events: false,
		}
	}

	/// Whether lookups ask the service for the transaction's events.
	pub fn with_include_events(mut self, include_events: bool) -> Self {
		self.include_events = include_events;
		self
	}

	/// Resolves the transaction to wait on, then polls for it.
	///
	/// Resolution failures are returned before any query is sent.
	pub async fn wait<R>(&self, resolver: &R, deadline: Instant) -> Result<PollOutcome, ClientError>
	where
		R: IdentityResolver + ?Sized,
	{
		let pending = resolver.resolve()?;
		self.poll(&pending, deadline).await
	}

	/// Polls until a terminal outcome or `deadline`.
	///
	/// Failed queries, service error objects and undecodable results are
	/// logged and retried. Chain id mismatches and stale responses are
	/// returned as errors.
	#[instrument(skip_all, fields(
		sender = %truncate_id(&pending.sender.to_hex()),
		sequence_number = pending.sequence_number,
		hash = %truncate_id(&pending.hash),
	))]
	pub async fn poll(
		&self,
		pending: &PendingTransaction,
		deadline: Instant,
	) -> Result<PollOutcome, ClientError> {
		let timeout = deadline.saturating_duration_since(Instant::now());
		let mut attempt: u32 = 0;

		while Instant::now() < deadline {
			attempt += 1;

			let query = self.transport.get_account_transaction(
				&pending.sender,
				pending.sequence_number,
				self.include_events,
			);
			let envelope = match tokio::time::timeout_at(deadline, query).await {
				Err(_) => break,
				Ok(Err(e)) => {
					tracing::warn!(attempt, error = %e, "Transaction query failed, retrying");
					self.sleep(deadline).await;
					continue;
				},
				Ok(Ok(envelope)) => envelope,
			};

			self.validator.validate(&envelope)?;

			if let Some(error) = &envelope.error {
				tracing::warn!(attempt, error = %error, "Service returned an error, retrying");
				self.sleep(deadline).await;
				continue;
			}
			if let Some(error) = &envelope.result_error {
				tracing::warn!(attempt, %error, "Undecodable transaction, retrying");
				self.sleep(deadline).await;
				continue;
			}

			match interpret(&pending.hash, envelope.result) {
				IterationResult::Found(outcome) => {
					tracing::info!(attempt, outcome = outcome.label(), "Transaction wait finished");
					return Ok(outcome);
				},
				IterationResult::NotFound => {
					let ledger_timestamp_usec = envelope
						.ledger_timestamp_usec
						.or_else(|| self.last_known_timestamp());

					if let Some(now_usec) = ledger_timestamp_usec {
						if is_expired(pending.expiration_timestamp_secs, now_usec) {
							tracing::info!(
								attempt,
								expiration_timestamp_secs = pending.expiration_timestamp_secs,
								ledger_timestamp_usec = now_usec,
								"Transaction expired"
							);
							return Ok(PollOutcome::Expired {
								expiration_timestamp_secs: pending.expiration_timestamp_secs,
								authority_timestamp_usec: now_usec,
							});
						}
					}

					tracing::debug!(attempt, ?ledger_timestamp_usec, "Transaction not found yet");
				},
			}

			self.sleep(deadline).await;
		}

		tracing::info!(attempt, timeout_ms = timeout.as_millis() as u64, "Transaction wait timed out");
		Ok(PollOutcome::TimedOut { timeout })
	}

	/// Ledger time from earlier responses, if any were seen.
	fn last_known_timestamp(&self) -> Option<u64> {
		let timestamp_usec = self.validator.tracker().current().timestamp_usec;
		(timestamp_usec > 0).then_some(timestamp_usec)
	}

	/// Sleeps for the retry delay, waking at `deadline` at the latest.
	async fn sleep(&self, deadline: Instant) {
		let wake = std::cmp::min(Instant::now() + self.retry_delay, deadline);
		tokio::time::sleep_until(wake).await;
	}
}
