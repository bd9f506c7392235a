//! Account address type.
//!
//! Addresses are 16 raw bytes. Human-readable encodings (JSON, TOML) carry
//! them as lower-case hex, binary encodings (BCS) carry the raw bytes.

use crate::utils::without_0x_prefix;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of bytes in an account address.
pub const ADDRESS_LENGTH: usize = 16;

/// Errors that can occur when parsing an account address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
	/// The input was not valid hexadecimal.
	#[error("Invalid address hex: {0}")]
	InvalidHex(String),
	/// The input decoded to the wrong number of bytes.
	#[error("Invalid address length: expected {expected} bytes, got {actual}")]
	InvalidLength { expected: usize, actual: usize },
}

/// Account address on the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountAddress(pub [u8; ADDRESS_LENGTH]);

impl AccountAddress {
	pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
		Self(bytes)
	}

	/// Parses an address from hex, with or without a `0x` prefix.
	pub fn from_hex(hex_str: &str) -> Result<Self, AddressError> {
		let bytes = hex::decode(without_0x_prefix(hex_str))
			.map_err(|e| AddressError::InvalidHex(e.to_string()))?;
		Self::from_bytes(&bytes)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
		let array: [u8; ADDRESS_LENGTH] =
			bytes.try_into().map_err(|_| AddressError::InvalidLength {
				expected: ADDRESS_LENGTH,
				actual: bytes.len(),
			})?;
		Ok(Self(array))
	}

	/// Lower-case hex without prefix, the form the RPC service expects.
	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl fmt::Display for AccountAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

impl fmt::Debug for AccountAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "AccountAddress({})", self.to_hex())
	}
}

impl FromStr for AccountAddress {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_hex(s)
	}
}

impl Serialize for AccountAddress {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		if serializer.is_human_readable() {
			serializer.serialize_str(&self.to_hex())
		} else {
			self.0.serialize(serializer)
		}
	}
}

impl<'de> Deserialize<'de> for AccountAddress {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		if deserializer.is_human_readable() {
			struct HexVisitor;

			impl Visitor<'_> for HexVisitor {
				type Value = AccountAddress;

				fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
					f.write_str("a hex encoded account address")
				}

				fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
					AccountAddress::from_hex(v).map_err(E::custom)
				}
			}

			deserializer.deserialize_str(HexVisitor)
		} else {
			<[u8; ADDRESS_LENGTH]>::deserialize(deserializer).map(AccountAddress)
		}
	}
}
