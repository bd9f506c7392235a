//! Classification of a single transaction lookup.

use ledger_types::{hashes_match, PollOutcome, TransactionRecord};

/// What one lookup says about the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationResult {
	/// The service does not know the transaction yet.
	NotFound,
	/// The lookup settled the transaction's fate.
	Found(PollOutcome),
}

/// Classifies the record returned for the expected transaction.
///
/// A record with a different hash is a mismatch even if it executed; the
/// hash is compared before the VM status.
pub fn interpret(expected_hash: &str, record: Option<TransactionRecord>) -> IterationResult {
	let Some(record) = record else {
		return IterationResult::NotFound;
	};

	// Hex case and a 0x prefix do not distinguish two hashes; any other
	// difference is a mismatch.
	if !hashes_match(expected_hash, &record.hash) {
		return IterationResult::Found(PollOutcome::HashMismatch {
			expected: expected_hash.to_string(),
			actual: record.hash,
		});
	}

	let outcome = if record.vm_status.is_executed() {
		PollOutcome::Confirmed(record)
	} else {
		PollOutcome::ExecutionFailed(record)
	};
	IterationResult::Found(outcome)
}
