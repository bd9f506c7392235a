//! Tracking of the latest ledger position seen by a client.

use ledger_types::LedgerState;
use parking_lot::Mutex;
use thiserror::Error;

/// A response reported a ledger position older than one already observed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("stale response error: expected ledger state at least {stored}, got {candidate}")]
pub struct StaleResponseError {
	/// Position the rejected response reported.
	pub candidate: LedgerState,
	/// Position stored when the response was rejected.
	pub stored: LedgerState,
}

/// Holds the most recent ledger position returned by the service.
///
/// One tracker is shared by every call made through a client. The stored
/// position never moves backwards through [`compare_and_update`]; the
/// read, comparison and write happen under a single lock.
///
/// [`compare_and_update`]: LedgerStateTracker::compare_and_update
#[derive(Debug, Default)]
pub struct LedgerStateTracker {
	state: Mutex<LedgerState>,
}

impl LedgerStateTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Tracker seeded with a known position.
	pub fn with_state(state: LedgerState) -> Self {
		Self {
			state: Mutex::new(state),
		}
	}

	/// Snapshot of the stored position.
	pub fn current(&self) -> LedgerState {
		*self.state.lock()
	}

	/// Overrides the stored position, including moving it backwards.
	pub fn set(&self, state: LedgerState) {
		*self.state.lock() = state;
	}

	/// Stores `candidate` unless it is older than the stored position.
	///
	/// A candidate equal to the stored position is accepted.
	pub fn compare_and_update(&self, candidate: LedgerState) -> Result<(), StaleResponseError> {
		let mut stored = self.state.lock();
		if !candidate.is_at_least(&stored) {
			return Err(StaleResponseError {
				candidate,
				stored: *stored,
			});
		}
		*stored = candidate;
		Ok(())
	}
}
