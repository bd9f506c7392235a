//! Ledger position and response envelope types.
//!
//! Every response from the ledger service carries, next to its payload, the
//! chain id and the ledger position (version and timestamp) the service
//! answered from. These types model that pairing independently of the wire
//! format a transport uses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The ledger service's position: a version counter and the matching
/// on-chain timestamp in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerState {
	/// Ledger version.
	pub version: u64,
	/// On-chain timestamp in microseconds.
	pub timestamp_usec: u64,
}

impl LedgerState {
	pub const fn new(version: u64, timestamp_usec: u64) -> Self {
		Self {
			version,
			timestamp_usec,
		}
	}

	/// Returns true if `self` is newer than or equal to `other`.
	///
	/// Ordered by version first, timestamp second.
	pub fn is_at_least(&self, other: &LedgerState) -> bool {
		(self.version, self.timestamp_usec) >= (other.version, other.timestamp_usec)
	}
}

impl fmt::Display for LedgerState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{{version: {}, timestamp_usec: {}}}",
			self.version, self.timestamp_usec
		)
	}
}

/// Error object returned by the service in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorObject {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<serde_json::Value>,
}

impl fmt::Display for RpcErrorObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (code {})", self.message, self.code)
	}
}

/// One response from the ledger service.
///
/// Produced once per call by a transport and consumed within a single
/// poll iteration. Metadata fields are optional because a service may omit
/// them; an absent position disables the staleness check for that response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope<T> {
	/// Chain id the service reported.
	pub chain_id: Option<u8>,
	/// Ledger version the service answered from.
	pub ledger_version: Option<u64>,
	/// Ledger timestamp, in microseconds, the service answered from.
	pub ledger_timestamp_usec: Option<u64>,
	/// Decoded result, `None` when the service returned nothing.
	pub result: Option<T>,
	/// Error object, if the call failed on the service side.
	pub error: Option<RpcErrorObject>,
	/// Why a result the service did send could not be decoded.
	///
	/// Metadata is still populated so the response can be validated.
	pub result_error: Option<String>,
}

impl<T> ResponseEnvelope<T> {
	/// Envelope carrying only a result and no metadata.
	pub fn with_result(result: Option<T>) -> Self {
		Self {
			chain_id: None,
			ledger_version: None,
			ledger_timestamp_usec: None,
			result,
			error: None,
			result_error: None,
		}
	}

	pub fn chain_id(mut self, chain_id: u8) -> Self {
		self.chain_id = Some(chain_id);
		self
	}

	pub fn ledger(mut self, version: u64, timestamp_usec: u64) -> Self {
		self.ledger_version = Some(version);
		self.ledger_timestamp_usec = Some(timestamp_usec);
		self
	}

	/// The ledger position, present only when both version and timestamp are.
	pub fn ledger_state(&self) -> Option<LedgerState> {
		match (self.ledger_version, self.ledger_timestamp_usec) {
			(Some(version), Some(timestamp_usec)) => Some(LedgerState::new(version, timestamp_usec)),
			_ => None,
		}
	}
}

/// Result of the `get_metadata` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
	/// Latest ledger version.
	pub version: u64,
	/// Latest ledger timestamp in microseconds.
	pub timestamp: u64,
	/// Chain id of the ledger.
	pub chain_id: u8,
}
