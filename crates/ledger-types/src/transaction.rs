//! Transaction types returned by the ledger service.
//!
//! This module defines the decoded transaction record, its execution status
//! and the identity used to locate a pending transaction.

use crate::AccountAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution outcome of a committed transaction.
///
/// The set of kinds is closed: a new kind reported by the service
/// fails to decode until it is added here and handled by every match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VmStatus {
	/// The transaction executed successfully.
	Executed,
	/// The transaction ran out of gas.
	OutOfGas,
	/// The transaction aborted in Move code.
	MoveAbort {
		/// Module that raised the abort.
		location: String,
		/// Abort code.
		abort_code: u64,
		/// Human readable explanation, when the service knows the error map.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		explanation: Option<MoveAbortExplanation>,
	},
	/// The VM failed while executing the transaction.
	ExecutionFailure {
		location: String,
		function_index: u16,
		code_offset: u16,
	},
	/// Any other VM error.
	MiscellaneousError,
	/// The transaction's code failed bytecode verification.
	VerificationError,
	/// The transaction's code or arguments could not be deserialized.
	DeserializationError,
	/// A module published by the transaction was rejected.
	PublishingFailure,
}

impl VmStatus {
	pub fn is_executed(&self) -> bool {
		matches!(self, VmStatus::Executed)
	}
}

impl fmt::Display for VmStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VmStatus::Executed => write!(f, "executed"),
			VmStatus::OutOfGas => write!(f, "out of gas"),
			VmStatus::MoveAbort {
				location,
				abort_code,
				explanation,
			} => {
				write!(f, "move abort in {} with code {}", location, abort_code)?;
				if let Some(explanation) = explanation {
					write!(f, " ({}: {})", explanation.category, explanation.reason)?;
				}
				Ok(())
			},
			VmStatus::ExecutionFailure {
				location,
				function_index,
				code_offset,
			} => write!(
				f,
				"execution failure in {} at function {} offset {}",
				location, function_index, code_offset
			),
			VmStatus::MiscellaneousError => write!(f, "miscellaneous error"),
			VmStatus::VerificationError => write!(f, "verification error"),
			VmStatus::DeserializationError => write!(f, "deserialization error"),
			VmStatus::PublishingFailure => write!(f, "publishing failure"),
		}
	}
}

/// Explanation attached to a Move abort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAbortExplanation {
	pub category: String,
	pub category_description: String,
	pub reason: String,
	pub reason_description: String,
}

/// Transaction body as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionData {
	/// A user submitted transaction.
	#[serde(rename = "user")]
	User(UserTransaction),
	/// Block prologue written by the validators.
	#[serde(rename = "blockmetadata")]
	BlockMetadata { timestamp_usecs: u64 },
	/// Write set transaction.
	#[serde(rename = "writeset")]
	WriteSet,
	/// A kind this client does not model.
	#[serde(rename = "unknown")]
	Unknown,
}

/// Fields of a user transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTransaction {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sender: Option<AccountAddress>,
	pub sequence_number: u64,
	pub chain_id: u8,
	pub expiration_timestamp_secs: u64,
	#[serde(default)]
	pub max_gas_amount: u64,
	#[serde(default)]
	pub gas_unit_price: u64,
	#[serde(default)]
	pub gas_currency: String,
	#[serde(default)]
	pub signature: String,
	#[serde(default)]
	pub public_key: String,
}

/// Event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
	pub key: String,
	pub sequence_number: u64,
	pub transaction_version: u64,
	#[serde(default)]
	pub data: serde_json::Value,
}

/// Decoded transaction record for a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
	/// Ledger version the transaction was committed at.
	pub version: u64,
	/// Transaction hash, hex encoded.
	pub hash: String,
	#[serde(default)]
	pub gas_used: u64,
	pub vm_status: VmStatus,
	pub transaction: TransactionData,
	/// Only populated when events were requested.
	#[serde(default)]
	pub events: Vec<Event>,
}

/// A submitted transaction the client is waiting on.
///
/// Addresses the transaction by sender and sequence number and carries the
/// hash and expiration it was signed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
	pub sender: AccountAddress,
	pub sequence_number: u64,
	/// Expected transaction hash, hex encoded.
	pub hash: String,
	/// Expiration time in seconds since the epoch.
	pub expiration_timestamp_secs: u64,
}

#[cfg(test)]
mod tests {
	use super::*;

	const EXECUTED_RECORD: &str = r#"{
		"events": [],
		"gas_used": 175,
		"hash": "0fa27a781a9086e80a870851ea4f1b14090fb8b5bd9933e27447ab806443e08e",
		"transaction": {
			"chain_id": 2,
			"expiration_timestamp_secs": 100000000000,
			"sequence_number": 0,
			"signature": "a181a036ba68fcd25a7ba9f3895caf720af7aee4bf86c4d798050a1101e75f71",
			"type": "user"
		},
		"version": 106548,
		"vm_status": { "type": "executed" }
	}"#;

	#[test]
	fn test_decode_executed_record() {
		let record: TransactionRecord = serde_json::from_str(EXECUTED_RECORD).unwrap();
		assert_eq!(record.version, 106548);
		assert_eq!(record.gas_used, 175);
		assert!(record.vm_status.is_executed());
		match record.transaction {
			TransactionData::User(user) => {
				assert_eq!(user.sequence_number, 0);
				assert_eq!(user.chain_id, 2);
				assert_eq!(user.sender, None);
			},
			other => panic!("unexpected transaction kind: {:?}", other),
		}
	}

	#[test]
	fn test_decode_move_abort() {
		let status: VmStatus = serde_json::from_str(
			r#"{ "type": "move_abort", "abort_code": 5, "location": "00000000000000000000000000000001::DiemAccount" }"#,
		)
		.unwrap();
		assert_eq!(
			status,
			VmStatus::MoveAbort {
				location: "00000000000000000000000000000001::DiemAccount".to_string(),
				abort_code: 5,
				explanation: None,
			}
		);
		assert!(status.to_string().contains("code 5"));
	}

	#[test]
	fn test_decode_failure_kinds() {
		for (kind, expected) in [
			("verification_error", VmStatus::VerificationError),
			("deserialization_error", VmStatus::DeserializationError),
			("publishing_failure", VmStatus::PublishingFailure),
		] {
			let status: VmStatus =
				serde_json::from_str(&format!(r#"{{ "type": "{}" }}"#, kind)).unwrap();
			assert_eq!(status, expected);
			assert!(!status.is_executed());
		}
	}

	#[test]
	fn test_unknown_vm_status_kind_is_rejected() {
		let result: Result<VmStatus, _> = serde_json::from_str(r#"{ "type": "brand_new" }"#);
		assert!(result.is_err());
	}

	#[test]
	fn test_decode_block_metadata() {
		let data: TransactionData =
			serde_json::from_str(r#"{ "type": "blockmetadata", "timestamp_usecs": 42 }"#).unwrap();
		assert_eq!(data, TransactionData::BlockMetadata { timestamp_usecs: 42 });
	}
}
