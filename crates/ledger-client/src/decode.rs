//! Decoding of hex encoded signed transactions.
//!
//! A signed transaction arrives as hex text. Decoding extracts the fields
//! the confirmation poller needs to find it on the ledger (sender, sequence
//! number, expiration) and computes the hash the service will report for it.
//!
//! The binary layout is BCS. Only the shapes needed to walk a user
//! transaction are modelled; write set payloads are rejected.

use ledger_types::{without_0x_prefix, AccountAddress, PendingTransaction};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};
use thiserror::Error;

/// Domain separator hashed into every transaction hash.
const TRANSACTION_HASH_SALT: &[u8] = b"DIEM::Transaction";

/// Tag of the user transaction variant in the ledger's transaction enum.
const USER_TRANSACTION_TAG: u8 = 0;

/// Errors that can occur while decoding a signed transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
	/// The input is not hexadecimal.
	#[error("invalid hex: {0}")]
	InvalidHex(String),
	/// The bytes do not form a signed transaction.
	#[error("invalid signed transaction: {0}")]
	InvalidStructure(String),
}

/// Fields extracted from a decoded signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
	pub sender: AccountAddress,
	pub sequence_number: u64,
	pub expiration_timestamp_secs: u64,
	pub chain_id: u8,
	/// Hex encoded transaction hash.
	pub hash: String,
}

impl DecodedTransaction {
	/// The pending transaction to wait on.
	pub fn into_pending(self) -> PendingTransaction {
		PendingTransaction {
			sender: self.sender,
			sequence_number: self.sequence_number,
			hash: self.hash,
			expiration_timestamp_secs: self.expiration_timestamp_secs,
		}
	}
}

/// Turns hex encoded signed transactions into their identity.
pub trait TransactionDecoder: Send + Sync {
	fn decode(&self, signed_txn_hex: &str) -> Result<DecodedTransaction, DecodeError>;
}

/// Decoder for BCS encoded signed transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcsTransactionDecoder;

impl TransactionDecoder for BcsTransactionDecoder {
	fn decode(&self, signed_txn_hex: &str) -> Result<DecodedTransaction, DecodeError> {
		let bytes = hex::decode(without_0x_prefix(signed_txn_hex.trim()))
			.map_err(|e| DecodeError::InvalidHex(e.to_string()))?;

		// Rejects trailing bytes
		let signed: SignedTransaction =
			bcs::from_bytes(&bytes).map_err(|e| DecodeError::InvalidStructure(e.to_string()))?;

		let raw = signed.raw_txn;
		Ok(DecodedTransaction {
			sender: raw.sender,
			sequence_number: raw.sequence_number,
			expiration_timestamp_secs: raw.expiration_timestamp_secs,
			chain_id: raw.chain_id,
			hash: transaction_hash(&bytes),
		})
	}
}

/// Hash the ledger assigns to a user transaction with these signed bytes.
pub fn transaction_hash(signed_txn_bytes: &[u8]) -> String {
	let salt = Sha3_256::digest(TRANSACTION_HASH_SALT);
	let mut hasher = Sha3_256::new();
	hasher.update(salt);
	hasher.update([USER_TRANSACTION_TAG]);
	hasher.update(signed_txn_bytes);
	hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
	pub raw_txn: RawTransaction,
	pub authenticator: TransactionAuthenticator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
	pub sender: AccountAddress,
	pub sequence_number: u64,
	pub payload: TransactionPayload,
	pub max_gas_amount: u64,
	pub gas_unit_price: u64,
	pub gas_currency_code: String,
	pub expiration_timestamp_secs: u64,
	pub chain_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
	WriteSet(UnsupportedWriteSet),
	Script(Script),
	Module(Module),
	ScriptFunction(ScriptFunction),
}

/// Placeholder for write set payloads, which cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedWriteSet;

impl Serialize for UnsupportedWriteSet {
	fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
		Err(S::Error::custom("write set payloads are not supported"))
	}
}

impl<'de> Deserialize<'de> for UnsupportedWriteSet {
	fn deserialize<D: Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {
		Err(D::Error::custom("write set payloads are not supported"))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
	pub code: Vec<u8>,
	pub ty_args: Vec<TypeTag>,
	pub args: Vec<TransactionArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
	pub code: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptFunction {
	pub module: ModuleId,
	pub function: String,
	pub ty_args: Vec<TypeTag>,
	pub args: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleId {
	pub address: AccountAddress,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
	Bool,
	U8,
	U64,
	U128,
	Address,
	Signer,
	Vector(Box<TypeTag>),
	Struct(StructTag),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructTag {
	pub address: AccountAddress,
	pub module: String,
	pub name: String,
	pub type_params: Vec<TypeTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionArgument {
	U8(u8),
	U64(u64),
	U128(u128),
	Address(AccountAddress),
	U8Vector(Vec<u8>),
	Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAuthenticator {
	Ed25519 {
		public_key: Vec<u8>,
		signature: Vec<u8>,
	},
	MultiEd25519 {
		public_key: Vec<u8>,
		signature: Vec<u8>,
	},
}
