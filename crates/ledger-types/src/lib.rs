//! Common types for the ledger confirmation client.
//!
//! This crate defines the data model shared by the transport, configuration
//! and client crates: account addresses, ledger positions, response
//! envelopes, transaction records and wait outcomes.

/// Account address type.
pub mod address;
/// Ledger position and response envelope types.
pub mod ledger;
/// Terminal outcomes of waiting on a transaction.
pub mod outcome;
/// Registry trait for pluggable implementations.
pub mod registry;
/// Transaction records and execution status.
pub mod transaction;
/// Formatting and hex helpers.
pub mod utils;
/// Configuration validation types.
pub mod validation;

pub use address::{AccountAddress, AddressError, ADDRESS_LENGTH};
pub use ledger::{LedgerState, Metadata, ResponseEnvelope, RpcErrorObject};
pub use outcome::PollOutcome;
pub use registry::ImplementationRegistry;
pub use transaction::{
	Event, MoveAbortExplanation, PendingTransaction, TransactionData, TransactionRecord,
	UserTransaction, VmStatus,
};
pub use utils::{hashes_match, truncate_id, without_0x_prefix};
pub use validation::*;
