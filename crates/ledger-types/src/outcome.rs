//! Terminal outcomes of waiting on a transaction.

use crate::TransactionRecord;
use std::time::Duration;

/// How a wait for a transaction ended.
///
/// Every variant is terminal: once the poller produces one it stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	/// The transaction was committed and executed successfully.
	Confirmed(TransactionRecord),
	/// The transaction was committed but its execution failed.
	ExecutionFailed(TransactionRecord),
	/// The service returned a transaction with a different hash.
	HashMismatch { expected: String, actual: String },
	/// The service's clock passed the transaction's expiration before it
	/// became visible.
	Expired {
		expiration_timestamp_secs: u64,
		authority_timestamp_usec: u64,
	},
	/// The caller's deadline elapsed first.
	TimedOut { timeout: Duration },
}

impl PollOutcome {
	pub fn is_confirmed(&self) -> bool {
		matches!(self, PollOutcome::Confirmed(_))
	}

	/// Short label for logs.
	pub fn label(&self) -> &'static str {
		match self {
			PollOutcome::Confirmed(_) => "confirmed",
			PollOutcome::ExecutionFailed(_) => "execution_failed",
			PollOutcome::HashMismatch { .. } => "hash_mismatch",
			PollOutcome::Expired { .. } => "expired",
			PollOutcome::TimedOut { .. } => "timed_out",
		}
	}
}
