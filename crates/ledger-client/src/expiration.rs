//! Expiration check against the service's clock.

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Returns true once the ledger clock has reached the expiration time.
///
/// The cutoff is inclusive: a ledger timestamp exactly at the expiration
/// second counts as expired.
pub fn is_expired(expiration_timestamp_secs: u64, ledger_timestamp_usec: u64) -> bool {
	ledger_timestamp_usec / MICROS_PER_SECOND >= expiration_timestamp_secs
}
