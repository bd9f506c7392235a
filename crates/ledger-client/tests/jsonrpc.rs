//! Waits against a local HTTP endpoint serving JSON-RPC replies.

use ledger_client::{AccountAddress, ClientError, LedgerClient, LedgerState, VmStatus};
use ledger_config::Config;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const HASH: &str = "0fa27a781a9086e80a870851ea4f1b14090fb8b5bd9933e27447ab806443e08e";
const EXPIRATION_SECS: u64 = 1597722856;

/// Reads one HTTP request, headers and body.
async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
	let mut buf = Vec::new();
	let mut chunk = [0u8; 4096];
	loop {
		let n = stream.read(&mut chunk).await?;
		if n == 0 {
			return Ok(());
		}
		buf.extend_from_slice(&chunk[..n]);

		if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
			let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
			let content_length = headers
				.lines()
				.find_map(|line| line.strip_prefix("content-length:"))
				.and_then(|value| value.trim().parse::<usize>().ok())
				.unwrap_or(0);
			if buf.len() >= end + 4 + content_length {
				return Ok(());
			}
		}
	}
}

/// Serves `replies` in order, repeating the last one. Returns the endpoint
/// URL and a request counter.
async fn serve(replies: Vec<String>) -> (String, Arc<AtomicUsize>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let url = format!("http://{}", listener.local_addr().unwrap());
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();

	tokio::spawn(async move {
		while let Ok((mut stream, _)) = listener.accept().await {
			let n = counter.fetch_add(1, Ordering::SeqCst);
			let body = replies[n.min(replies.len() - 1)].clone();
			tokio::spawn(async move {
				if read_request(&mut stream).await.is_ok() {
					let response = format!(
						"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
						body.len(),
						body
					);
					let _ = stream.write_all(response.as_bytes()).await;
					let _ = stream.shutdown().await;
				}
			});
		}
	});

	(url, calls)
}

fn transaction_reply(chain_id: u8, version: u64, result: &str) -> String {
	format!(
		r#"{{
			"jsonrpc": "2.0",
			"diem_chain_id": {chain_id},
			"diem_ledger_version": {version},
			"diem_ledger_timestampusec": 1597722850000000,
			"result": {result}
		}}"#
	)
}

fn record(vm_status: &str) -> String {
	format!(
		r#"{{
			"events": [],
			"gas_used": 175,
			"hash": "{HASH}",
			"transaction": {{
				"chain_id": 2,
				"expiration_timestamp_secs": {EXPIRATION_SECS},
				"sequence_number": 0,
				"type": "user"
			}},
			"version": 106548,
			"vm_status": {vm_status}
		}}"#
	)
}

fn client(url: &str) -> LedgerClient {
	let config: Config = format!(
		r#"
[client]
chain_id = 2
retry_delay_ms = 10

[transport]
primary = "jsonrpc"
[transport.implementations.jsonrpc]
url = "{url}"
request_timeout_seconds = 5
"#
	)
	.parse()
	.unwrap();
	LedgerClient::from_config(&config).unwrap()
}

async fn wait(client: &LedgerClient) -> Result<ledger_client::TransactionRecord, ClientError> {
	client
		.wait_for_transaction(
			AccountAddress::new([0x11; 16]),
			0,
			HASH,
			EXPIRATION_SECS,
			Duration::from_secs(5),
		)
		.await
}

#[tokio::test]
async fn executed_record_is_confirmed() {
	let (url, calls) = serve(vec![
		transaction_reply(2, 10, "null"),
		transaction_reply(2, 11, &record(r#"{ "type": "executed" }"#)),
	])
	.await;
	let client = client(&url);

	let confirmed = wait(&client).await.unwrap();

	assert_eq!(confirmed.vm_status, VmStatus::Executed);
	assert_eq!(calls.load(Ordering::SeqCst), 2);
	assert_eq!(
		client.last_response_ledger_state(),
		LedgerState::new(11, 1597722850000000)
	);
}

#[tokio::test]
async fn every_failure_kind_ends_the_wait() {
	let kinds = [
		r#"{ "type": "out_of_gas" }"#,
		r#"{ "type": "move_abort", "abort_code": 5, "location": "00000000000000000000000000000001::DiemAccount" }"#,
		r#"{ "type": "execution_failure", "location": "00000000000000000000000000000001::DiemAccount", "function_index": 3, "code_offset": 12 }"#,
		r#"{ "type": "miscellaneous_error" }"#,
		r#"{ "type": "verification_error" }"#,
		r#"{ "type": "deserialization_error" }"#,
		r#"{ "type": "publishing_failure" }"#,
	];

	for vm_status in kinds {
		let (url, calls) = serve(vec![transaction_reply(2, 10, &record(vm_status))]).await;

		let err = wait(&client(&url)).await.unwrap_err();

		assert!(
			matches!(err, ClientError::TransactionExecutionFailed { .. }),
			"{vm_status}: {err}"
		);
		assert!(!err.is_retryable());
		assert_eq!(calls.load(Ordering::SeqCst), 1, "{vm_status}");
	}
}

#[tokio::test]
async fn wrong_chain_is_reported_even_when_result_is_undecodable() {
	let (url, calls) = serve(vec![transaction_reply(9, 10, r#"{ "hash": 42 }"#)]).await;

	let err = wait(&client(&url)).await.unwrap_err();

	assert!(matches!(
		err,
		ClientError::ChainIdMismatch {
			expected: 2,
			actual: 9
		}
	));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}
