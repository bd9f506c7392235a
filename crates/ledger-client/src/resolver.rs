//! Resolution of the transaction a wait is about.
//!
//! A wait can start from an already known identity or from a signed
//! transaction still in hex form. Both resolve to a [`PendingTransaction`]
//! before any query is sent, so one poll loop serves every entry point.

use crate::decode::{DecodedTransaction, TransactionDecoder};
use crate::error::ClientError;
use ledger_types::PendingTransaction;

/// Produces the pending transaction to wait on.
pub trait IdentityResolver: Send + Sync {
	fn resolve(&self) -> Result<PendingTransaction, ClientError>;
}

impl IdentityResolver for PendingTransaction {
	fn resolve(&self) -> Result<PendingTransaction, ClientError> {
		Ok(self.clone())
	}
}

/// A hex encoded signed transaction together with its decoder.
pub struct SignedTransactionHex<'a> {
	hex: &'a str,
	decoder: &'a dyn TransactionDecoder,
}

impl<'a> SignedTransactionHex<'a> {
	pub fn new(hex: &'a str, decoder: &'a dyn TransactionDecoder) -> Self {
		Self { hex, decoder }
	}
}

impl IdentityResolver for SignedTransactionHex<'_> {
	fn resolve(&self) -> Result<PendingTransaction, ClientError> {
		let decoded = self.decoder.decode(self.hex)?;
		Ok(DecodedTransaction::into_pending(decoded))
	}
}
