//! Client side confirmation of ledger transactions.
//!
//! The ledger service is only reachable through polled RPC calls and may
//! answer from different replicas. This crate waits on a submitted
//! transaction while guarding against that: every response is checked for
//! the expected chain id and for a ledger position no older than one
//! already seen, before its content is trusted.
//!
//! [`LedgerClient`] is the entry point. It owns a [`LedgerStateTracker`]
//! shared by all its clones and drives a [`ConfirmationPoller`] for each
//! wait.

pub mod client;
pub mod decode;
pub mod error;
pub mod expiration;
pub mod interpreter;
pub mod poller;
pub mod resolver;
pub mod tracker;
pub mod validator;

pub use client::LedgerClient;
pub use decode::{BcsTransactionDecoder, DecodeError, DecodedTransaction, TransactionDecoder};
pub use error::{outcome_into_result, ClientError};
pub use expiration::is_expired;
pub use interpreter::{interpret, IterationResult};
pub use poller::ConfirmationPoller;
pub use resolver::{IdentityResolver, SignedTransactionHex};
pub use tracker::{LedgerStateTracker, StaleResponseError};
pub use validator::{ResponseError, ResponseValidator};

pub use ledger_types::{
	AccountAddress, LedgerState, Metadata, PendingTransaction, PollOutcome, ResponseEnvelope,
	TransactionRecord, VmStatus,
};
