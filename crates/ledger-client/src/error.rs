//! Errors returned by the ledger client.

use crate::decode::DecodeError;
use crate::tracker::StaleResponseError;
use crate::validator::ResponseError;
use ledger_transport::TransportError;
use ledger_types::{LedgerState, PollOutcome, RpcErrorObject, TransactionRecord};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while querying the ledger or waiting on a
/// transaction.
///
/// Each terminal way a wait can end is its own variant, so callers can
/// tell a transaction that will never land from one worth waiting on
/// again. See [`ClientError::is_retryable`].
#[derive(Debug, Error)]
pub enum ClientError {
	/// The service is on a different chain than the client.
	#[error("chain id mismatch error: expected {expected}, got {actual}")]
	ChainIdMismatch { expected: u8, actual: u8 },
	/// The service answered from an older ledger position than already seen.
	#[error("stale response error: expected ledger state at least {stored}, got {candidate}")]
	StaleResponse {
		candidate: LedgerState,
		stored: LedgerState,
	},
	/// The signed transaction could not be decoded.
	#[error("decode signed transaction failed: {0}")]
	Decode(#[from] DecodeError),
	/// The service returned a different transaction than expected.
	#[error("transaction hash does not match: expected {expected}, got {actual}")]
	TransactionHashMismatch { expected: String, actual: String },
	/// The transaction was committed but did not execute successfully.
	#[error("transaction execution failed: {}", .record.vm_status)]
	TransactionExecutionFailed { record: Box<TransactionRecord> },
	/// The ledger clock passed the transaction's expiration.
	#[error("transaction expired: expiration {expiration_timestamp_secs}s, ledger time {ledger_timestamp_usec}us")]
	TransactionExpired {
		expiration_timestamp_secs: u64,
		ledger_timestamp_usec: u64,
	},
	/// The caller's deadline elapsed before any other outcome.
	#[error("transaction not found within timeout period: {timeout:?}")]
	ConfirmationTimeout { timeout: Duration },
	/// A single query failed in transport.
	#[error("transport error: {0}")]
	Transport(#[from] TransportError),
	/// The service answered a single query with an error object.
	#[error("rpc error: {0}")]
	Rpc(RpcErrorObject),
	/// The client could not be built from configuration.
	#[error("configuration error: {0}")]
	Configuration(String),
}

impl ClientError {
	/// Returns true when trying again later may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			ClientError::ConfirmationTimeout { .. }
				| ClientError::Transport(_)
				| ClientError::Rpc(_)
		)
	}
}

impl From<StaleResponseError> for ClientError {
	fn from(err: StaleResponseError) -> Self {
		ClientError::StaleResponse {
			candidate: err.candidate,
			stored: err.stored,
		}
	}
}

impl From<ResponseError> for ClientError {
	fn from(err: ResponseError) -> Self {
		match err {
			ResponseError::ChainIdMismatch { expected, actual } => {
				ClientError::ChainIdMismatch { expected, actual }
			},
			ResponseError::StaleResponse(stale) => stale.into(),
		}
	}
}

/// Maps a wait outcome onto the confirmed record or the matching error.
pub fn outcome_into_result(outcome: PollOutcome) -> Result<TransactionRecord, ClientError> {
	match outcome {
		PollOutcome::Confirmed(record) => Ok(record),
		PollOutcome::ExecutionFailed(record) => Err(ClientError::TransactionExecutionFailed {
			record: Box::new(record),
		}),
		PollOutcome::HashMismatch { expected, actual } => {
			Err(ClientError::TransactionHashMismatch { expected, actual })
		},
		PollOutcome::Expired {
			expiration_timestamp_secs,
			authority_timestamp_usec,
		} => Err(ClientError::TransactionExpired {
			expiration_timestamp_secs,
			ledger_timestamp_usec: authority_timestamp_usec,
		}),
		PollOutcome::TimedOut { timeout } => Err(ClientError::ConfirmationTimeout { timeout }),
	}
}
