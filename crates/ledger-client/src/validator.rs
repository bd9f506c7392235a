//! Checks applied to every response before its payload is interpreted.

use crate::tracker::{LedgerStateTracker, StaleResponseError};
use ledger_types::ResponseEnvelope;
use std::sync::Arc;
use thiserror::Error;

/// Reasons a response is rejected before interpretation.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ResponseError {
	/// The service reported a different chain than the client expects.
	#[error("chain id mismatch error: expected {expected}, got {actual}")]
	ChainIdMismatch { expected: u8, actual: u8 },
	/// The service answered from a ledger position older than one already seen.
	#[error(transparent)]
	StaleResponse(#[from] StaleResponseError),
}

/// Validates response metadata against the expected chain and the tracker.
#[derive(Debug, Clone)]
pub struct ResponseValidator {
	expected_chain_id: u8,
	tracker: Arc<LedgerStateTracker>,
}

impl ResponseValidator {
	pub fn new(expected_chain_id: u8, tracker: Arc<LedgerStateTracker>) -> Self {
		Self {
			expected_chain_id,
			tracker,
		}
	}

	pub fn expected_chain_id(&self) -> u8 {
		self.expected_chain_id
	}

	pub fn tracker(&self) -> &Arc<LedgerStateTracker> {
		&self.tracker
	}

	/// Checks the chain id, then advances the tracker to the response's
	/// ledger position.
	///
	/// Absent metadata skips the matching check. A chain id mismatch leaves
	/// the tracker untouched.
	pub fn validate<T>(&self, envelope: &ResponseEnvelope<T>) -> Result<(), ResponseError> {
		if let Some(actual) = envelope.chain_id {
			if actual != self.expected_chain_id {
				return Err(ResponseError::ChainIdMismatch {
					expected: self.expected_chain_id,
					actual,
				});
			}
		}

		if let Some(candidate) = envelope.ledger_state() {
			self.tracker.compare_and_update(candidate)?;
		}

		Ok(())
	}
}
