mod client;
mod error;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use client::*;
pub use error::*;

pub const JSON_RPC_VERSION: &str = "2.0";

pub type Id = u64;

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcRequest<'a, P> {
    pub jsonrpc: &'a str,
    pub id: Id,
    pub method: &'a str,
    pub params: P,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: Option<String>,
    pub id: Option<Id>,
    // `null` is a valid result (no receipt yet), keep it as a Value
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}
