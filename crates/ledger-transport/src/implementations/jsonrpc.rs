//! JSON-RPC over HTTP transport.
//!
//! Sends JSON-RPC 2.0 requests with `reqwest` and maps the reply, including
//! the ledger metadata the service attaches to every response, onto a
//! [`ResponseEnvelope`].

use crate::{TransportError, TransportFactory, TransportInterface, TransportRegistry};
use async_trait::async_trait;
use ledger_types::{
	AccountAddress, ConfigSchema, Field, FieldType, ImplementationRegistry, Metadata,
	ResponseEnvelope, RpcErrorObject, Schema, TransactionRecord, ValidationError,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// JSON-RPC request body.
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
	jsonrpc: &'static str,
	id: u64,
	method: &'static str,
	params: Value,
}

/// JSON-RPC response body, with the ledger metadata fields the service adds.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
	#[serde(default)]
	id: Option<u64>,
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<RpcErrorObject>,
	#[serde(default)]
	diem_chain_id: Option<u8>,
	#[serde(default)]
	diem_ledger_version: Option<u64>,
	#[serde(default)]
	diem_ledger_timestampusec: Option<u64>,
}

impl JsonRpcResponse {
	/// Converts the wire response into an envelope, decoding the result as `T`.
	///
	/// A `null` or missing result means the service has nothing to return.
	/// A result that does not decode is reported in `result_error`, keeping
	/// the ledger metadata of the response.
	fn into_envelope<T: DeserializeOwned>(
		self,
		request_id: u64,
	) -> Result<ResponseEnvelope<T>, TransportError> {
		if let Some(id) = self.id {
			if id != request_id {
				return Err(TransportError::Decode(format!(
					"Response id {} does not match request id {}",
					id, request_id
				)));
			}
		}

		let (result, result_error) = match self.result.map(serde_json::from_value::<T>) {
			None => (None, None),
			Some(Ok(result)) => (Some(result), None),
			Some(Err(e)) => (None, Some(format!("Invalid result: {}", e))),
		};

		Ok(ResponseEnvelope {
			chain_id: self.diem_chain_id,
			ledger_version: self.diem_ledger_version,
			ledger_timestamp_usec: self.diem_ledger_timestampusec,
			result,
			error: self.error,
			result_error,
		})
	}
}

/// Transport that talks JSON-RPC to a single HTTP endpoint.
pub struct JsonRpcTransport {
	client: reqwest::Client,
	url: String,
	next_id: AtomicU64,
}

impl JsonRpcTransport {
	/// Creates a transport for `url` with a per-request timeout.
	pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, TransportError> {
		let client = reqwest::Client::builder()
			.timeout(request_timeout)
			.build()
			.map_err(|e| {
				TransportError::Configuration(format!("Failed to create HTTP client: {}", e))
			})?;

		Ok(Self {
			client,
			url: url.into(),
			next_id: AtomicU64::new(1),
		})
	}

	fn request(&self, method: &'static str, params: Value) -> JsonRpcRequest {
		JsonRpcRequest {
			jsonrpc: "2.0",
			id: self.next_id.fetch_add(1, Ordering::Relaxed),
			method,
			params,
		}
	}

	async fn call<T: DeserializeOwned>(
		&self,
		method: &'static str,
		params: Value,
	) -> Result<ResponseEnvelope<T>, TransportError> {
		let request = self.request(method, params);
		tracing::trace!(method, id = request.id, "Sending JSON-RPC request");

		let response = self
			.client
			.post(&self.url)
			.json(&request)
			.send()
			.await
			.map_err(|e| TransportError::Network(format!("Failed to send {}: {}", method, e)))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(TransportError::Http {
				status: status.as_u16(),
				body,
			});
		}

		let body: JsonRpcResponse = response
			.json()
			.await
			.map_err(|e| TransportError::Decode(format!("Invalid JSON-RPC response: {}", e)))?;

		body.into_envelope(request.id)
	}
}

#[async_trait]
impl TransportInterface for JsonRpcTransport {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(JsonRpcTransportSchema)
	}

	async fn get_account_transaction(
		&self,
		address: &AccountAddress,
		sequence_number: u64,
		include_events: bool,
	) -> Result<ResponseEnvelope<TransactionRecord>, TransportError> {
		self.call(
			"get_account_transaction",
			json!([address.to_hex(), sequence_number, include_events]),
		)
		.await
	}

	async fn get_metadata(&self) -> Result<ResponseEnvelope<Metadata>, TransportError> {
		self.call("get_metadata", json!([])).await
	}
}

/// Configuration schema for the JSON-RPC transport.
pub struct JsonRpcTransportSchema;

impl ConfigSchema for JsonRpcTransportSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("url", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
						Ok(())
					},
					_ => Err("url must be an http(s) URL".to_string()),
				}
			})],
			vec![Field::new(
				"request_timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(300),
				},
			)],
		);

		schema.validate(config)
	}
}

/// Factory function to create a JSON-RPC transport from configuration.
///
/// Expects `url` (required) and `request_timeout_seconds` (optional,
/// defaults to 10).
pub fn create_jsonrpc_transport(
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	JsonRpcTransportSchema
		.validate(config)
		.map_err(|e| TransportError::Configuration(format!("Invalid configuration: {}", e)))?;

	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| TransportError::Configuration("url is required".to_string()))?;

	let timeout_seconds = config
		.get("request_timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);

	let transport = JsonRpcTransport::new(url, Duration::from_secs(timeout_seconds))?;
	Ok(Box::new(transport))
}

/// Registry for the JSON-RPC transport.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "jsonrpc";
	type Factory = TransportFactory;

	fn factory() -> Self::Factory {
		create_jsonrpc_transport
	}
}

impl TransportRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use ledger_types::{LedgerState, VmStatus};

	#[test]
	fn test_request_ids_increase() {
		let transport =
			JsonRpcTransport::new("http://localhost:8080", Duration::from_secs(1)).unwrap();
		let first = transport.request("get_metadata", json!([]));
		let second = transport.request("get_metadata", json!([]));
		assert_eq!(first.id + 1, second.id);

		let body = serde_json::to_value(&first).unwrap();
		assert_eq!(body["jsonrpc"], "2.0");
		assert_eq!(body["method"], "get_metadata");
	}

	#[test]
	fn test_metadata_response_into_envelope() {
		let response: JsonRpcResponse = serde_json::from_str(
			r#"{
				"id": 1,
				"jsonrpc": "2.0",
				"diem_chain_id": 2,
				"diem_ledger_version": 11,
				"diem_ledger_timestampusec": 1597722856123488,
				"result": { "timestamp": 1597722856123488, "version": 11, "chain_id": 2 }
			}"#,
		)
		.unwrap();

		let envelope: ResponseEnvelope<Metadata> = response.into_envelope(1).unwrap();
		assert_eq!(envelope.chain_id, Some(2));
		assert_eq!(
			envelope.ledger_state(),
			Some(LedgerState::new(11, 1597722856123488))
		);
		assert_eq!(envelope.result.unwrap().version, 11);
	}

	#[test]
	fn test_null_result_is_absent() {
		let response: JsonRpcResponse = serde_json::from_str(
			r#"{ "id": 3, "jsonrpc": "2.0", "diem_ledger_timestampusec": 1597722856000000, "result": null }"#,
		)
		.unwrap();

		let envelope: ResponseEnvelope<TransactionRecord> = response.into_envelope(3).unwrap();
		assert!(envelope.result.is_none());
		assert_eq!(envelope.ledger_timestamp_usec, Some(1597722856000000));
		assert_eq!(envelope.ledger_state(), None);
	}

	#[test]
	fn test_transaction_result_decoded() {
		let response: JsonRpcResponse = serde_json::from_str(
			r#"{
				"id": 2,
				"jsonrpc": "2.0",
				"result": {
					"events": [],
					"gas_used": 175,
					"hash": "0fa27a781a9086e80a870851ea4f1b14090fb8b5bd9933e27447ab806443e08e",
					"transaction": {
						"chain_id": 2,
						"expiration_timestamp_secs": 100000000000,
						"sequence_number": 0,
						"type": "user"
					},
					"version": 106548,
					"vm_status": { "type": "move_abort", "abort_code": 5, "location": "00000000000000000000000000000001::DiemAccount" }
				}
			}"#,
		)
		.unwrap();

		let envelope: ResponseEnvelope<TransactionRecord> = response.into_envelope(2).unwrap();
		let record = envelope.result.unwrap();
		assert!(matches!(
			record.vm_status,
			VmStatus::MoveAbort { abort_code: 5, .. }
		));
	}

	#[test]
	fn test_error_object_kept() {
		let response: JsonRpcResponse = serde_json::from_str(
			r#"{ "id": 4, "jsonrpc": "2.0", "error": { "code": -32602, "message": "Invalid params" } }"#,
		)
		.unwrap();

		let envelope: ResponseEnvelope<Metadata> = response.into_envelope(4).unwrap();
		assert!(envelope.result.is_none());
		assert_eq!(envelope.error.unwrap().code, -32602);
	}

	#[test]
	fn test_mismatched_id_rejected() {
		let response: JsonRpcResponse =
			serde_json::from_str(r#"{ "id": 9, "jsonrpc": "2.0", "result": null }"#).unwrap();
		let result: Result<ResponseEnvelope<Metadata>, _> = response.into_envelope(1);
		assert!(matches!(result, Err(TransportError::Decode(_))));
	}

	#[test]
	fn test_undecodable_result_keeps_metadata() {
		let response: JsonRpcResponse = serde_json::from_str(
			r#"{
				"id": 1,
				"jsonrpc": "2.0",
				"diem_chain_id": 9,
				"diem_ledger_version": 12,
				"diem_ledger_timestampusec": 1597722856123500,
				"result": { "version": "not a number" }
			}"#,
		)
		.unwrap();

		let envelope: ResponseEnvelope<Metadata> = response.into_envelope(1).unwrap();
		assert!(envelope.result.is_none());
		assert!(envelope.result_error.as_ref().unwrap().contains("Invalid result"));
		assert_eq!(envelope.chain_id, Some(9));
		assert_eq!(
			envelope.ledger_state(),
			Some(LedgerState::new(12, 1597722856123500))
		);
	}

	#[test]
	fn test_every_vm_status_kind_decodes() {
		let statuses = [
			(r#"{ "type": "executed" }"#, true),
			(r#"{ "type": "out_of_gas" }"#, false),
			(
				r#"{ "type": "move_abort", "abort_code": 5, "location": "00000000000000000000000000000001::DiemAccount" }"#,
				false,
			),
			(
				r#"{ "type": "execution_failure", "location": "00000000000000000000000000000001::DiemAccount", "function_index": 3, "code_offset": 12 }"#,
				false,
			),
			(r#"{ "type": "miscellaneous_error" }"#, false),
			(r#"{ "type": "verification_error" }"#, false),
			(r#"{ "type": "deserialization_error" }"#, false),
			(r#"{ "type": "publishing_failure" }"#, false),
		];

		for (id, (vm_status, executed)) in statuses.into_iter().enumerate() {
			let body = format!(
				r#"{{
					"id": {id},
					"jsonrpc": "2.0",
					"diem_chain_id": 2,
					"diem_ledger_version": 106548,
					"diem_ledger_timestampusec": 1597722856123488,
					"result": {{
						"events": [],
						"gas_used": 175,
						"hash": "0fa27a781a9086e80a870851ea4f1b14090fb8b5bd9933e27447ab806443e08e",
						"transaction": {{ "type": "unknown" }},
						"version": 106548,
						"vm_status": {vm_status}
					}}
				}}"#
			);
			let response: JsonRpcResponse = serde_json::from_str(&body).unwrap();
			let envelope: ResponseEnvelope<TransactionRecord> =
				response.into_envelope(id as u64).unwrap();

			assert_eq!(envelope.result_error, None, "{}", vm_status);
			assert_eq!(envelope.result.unwrap().vm_status.is_executed(), executed);
		}
	}

	#[test]
	fn test_schema_validation() {
		let valid: toml::Value = toml::from_str(r#"url = "https://rpc.example""#).unwrap();
		assert!(JsonRpcTransportSchema.validate(&valid).is_ok());

		let invalid: toml::Value = toml::from_str(r#"url = "rpc.example""#).unwrap();
		assert!(JsonRpcTransportSchema.validate(&invalid).is_err());

		let missing: toml::Value = toml::from_str("request_timeout_seconds = 5").unwrap();
		assert!(create_jsonrpc_transport(&missing).is_err());
	}
}
