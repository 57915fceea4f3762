//! JSON-RPC request/response wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;

/// Inbound request. The version field is tolerated but not enforced:
/// bitcoind tooling variously sends "1.0", "2.0" or nothing at all.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, err: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(err.into_wire()),
            id,
        }
    }
}
