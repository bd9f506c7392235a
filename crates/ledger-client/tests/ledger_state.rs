//! Ledger state tracking across calls made through one client.

use ledger_client::{ClientError, LedgerClient, LedgerState, Metadata, ResponseEnvelope};
use ledger_transport::implementations::stub::StubTransport;
use std::sync::Arc;

fn metadata(version: u64, timestamp_usec: u64) -> ResponseEnvelope<Metadata> {
	ResponseEnvelope::with_result(Some(Metadata {
		version,
		timestamp: timestamp_usec,
		chain_id: 2,
	}))
	.chain_id(2)
	.ledger(version, timestamp_usec)
}

#[tokio::test]
async fn accepted_states_never_decrease() {
	let states = [(1, 100), (1, 100), (1, 150), (4, 90), (4, 90), (7, 200)];
	let stub = states
		.iter()
		.fold(StubTransport::new(), |stub, (v, ts)| stub.with_metadata(metadata(*v, *ts)));
	let client = LedgerClient::new(2, Arc::new(stub));

	let mut previous = client.last_response_ledger_state();
	for _ in states {
		client.get_metadata().await.unwrap();
		let current = client.last_response_ledger_state();
		assert!(current.is_at_least(&previous));
		previous = current;
	}
	assert_eq!(previous, LedgerState::new(7, 200));
}

#[tokio::test]
async fn stale_responses_rejected_against_latest_state() {
	let stored = LedgerState::new(10, 1597722856123477);
	let stub = StubTransport::new()
		.with_metadata(metadata(9, 1597722856123456))
		.with_metadata(metadata(10, 1597722856123456))
		.with_metadata(metadata(11, 1597722856123488));
	let client = LedgerClient::new(2, Arc::new(stub));
	client.update_last_response_ledger_state(stored);

	for rejected in [
		LedgerState::new(9, 1597722856123456),
		LedgerState::new(10, 1597722856123456),
	] {
		match client.get_metadata().await.unwrap_err() {
			ClientError::StaleResponse {
				candidate,
				stored: reported,
			} => {
				assert_eq!(candidate, rejected);
				assert_eq!(reported, stored);
			},
			other => panic!("unexpected error: {other}"),
		}
		assert_eq!(client.last_response_ledger_state(), stored);
	}

	client.get_metadata().await.unwrap();
	assert_eq!(
		client.last_response_ledger_state(),
		LedgerState::new(11, 1597722856123488)
	);
}

#[tokio::test]
async fn stale_error_names_both_states() {
	let stub = StubTransport::new().with_metadata(metadata(9, 1597722856123456));
	let client = LedgerClient::new(2, Arc::new(stub));
	client.update_last_response_ledger_state(LedgerState::new(10, 1597722856123477));

	let message = client.get_metadata().await.unwrap_err().to_string();
	assert!(message.contains("version: 10"));
	assert!(message.contains("timestamp_usec: 1597722856123477"));
	assert!(message.contains("version: 9"));
	assert!(message.contains("timestamp_usec: 1597722856123456"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn clones_share_one_tracker() {
	let stub = Arc::new(StubTransport::new());
	for version in 1..=64 {
		stub.push_transaction(
			ResponseEnvelope::with_result(None)
				.chain_id(2)
				.ledger(version, version * 1_000),
		);
	}
	let client = LedgerClient::new(2, stub.clone());
	let address = ledger_client::AccountAddress::new([7; 16]);

	let tasks: Vec<_> = (0..8)
		.map(|_| {
			let client = client.clone();
			tokio::spawn(async move {
				let mut accepted = 0;
				for _ in 0..8 {
					match client.get_account_transaction(&address, 0, false).await {
						Ok(_) => accepted += 1,
						Err(ClientError::StaleResponse { .. }) => {},
						Err(other) => panic!("unexpected error: {other}"),
					}
				}
				accepted
			})
		})
		.collect();

	let mut accepted = 0;
	for task in tasks {
		accepted += task.await.unwrap();
	}

	assert!(accepted > 0);
	assert_eq!(stub.transaction_calls(), 64);
	assert_eq!(
		client.last_response_ledger_state(),
		LedgerState::new(64, 64_000)
	);
}
