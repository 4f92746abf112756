use log::{debug, trace};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use super::{RpcError, RpcRequest, RpcResponse, JSON_RPC_VERSION};
use crate::{config::DEFAULT_REQUEST_TIMEOUT_SECS, utils::sanitize_rpc_address};

// JSON-RPC 2.0 client over HTTP
// Timeouts are handled by the HTTP client, not by callers
pub struct JsonRpcClient {
    target: String,
    client: reqwest::Client,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(target: &str) -> Result<Self, RpcError> {
        Self::with(target, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with(target: &str, timeout: Duration) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            target: sanitize_rpc_address(target),
            client,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn get_target(&self) -> &str {
        &self.target
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    // Call a method and return the raw result, which may be `null`
    pub async fn call_raw<P: Serialize>(&self, method: &str, params: &P) -> Result<Value, RpcError> {
        let id = self.next_id();
        if log::log_enabled!(log::Level::Trace) {
            trace!("RPC request #{}: {}", id, method);
        }

        let request = RpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            id,
            method,
            params,
        };

        let response = self.client.post(&self.target).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            if log::log_enabled!(log::Level::Debug) {
                debug!("RPC request #{} {} failed with status {}", id, method, status);
            }
            return Err(RpcError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let response: RpcResponse = serde_json::from_slice(&bytes)?;
        parse_response(method, response)
    }

    // Call a method and deserialize its result, `null` being an error
    pub async fn call_with<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<R, RpcError> {
        let value = self.call_raw(method, params).await?;
        if value.is_null() {
            return Err(RpcError::MissingResult(method.to_owned()));
        }
        Ok(serde_json::from_value(value)?)
    }

    // Call a method and deserialize its optional result
    pub async fn call_optional<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
    ) -> Result<Option<R>, RpcError> {
        let value = self.call_raw(method, params).await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

fn parse_response(method: &str, response: RpcResponse) -> Result<Value, RpcError> {
    if let Some(error) = response.error {
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "RPC {} returned error {}: {}",
                method, error.code, error.message
            );
        }
        return Err(RpcError::Server {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }

    Ok(response.result.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> RpcResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_result() {
        let value = parse_response(
            "eth_call",
            response(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x01" })),
        )
        .unwrap();
        assert_eq!(value, json!("0x01"));
    }

    #[test]
    fn test_parse_null_result() {
        let value = parse_response(
            "eth_getTransactionReceipt",
            response(json!({ "jsonrpc": "2.0", "id": 1, "result": null })),
        )
        .unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_parse_server_error() {
        let err = parse_response(
            "eth_sendTransaction",
            response(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": 3, "message": "execution reverted", "data": "0x08c379a0" }
            })),
        )
        .unwrap_err();
        assert!(err.is_execution_error());
        assert!(matches!(err, RpcError::Server { code: 3, .. }));
    }

    #[test]
    fn test_request_wire_format() {
        let request = RpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            id: 4,
            method: "eth_accounts",
            params: Vec::<Value>::new(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "jsonrpc": "2.0", "id": 4, "method": "eth_accounts", "params": [] })
        );
    }

    #[test]
    fn test_client_sanitizes_target() {
        let client = JsonRpcClient::new("127.0.0.1:8545").unwrap();
        assert_eq!(client.get_target(), "http://127.0.0.1:8545");
    }
}
