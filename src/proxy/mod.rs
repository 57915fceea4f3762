//! Backend proxy router - verbatim pass-through to a bitcoind node
//!
//! A fixed allow-list of read-only/network methods is forwarded to the
//! backend node unmodified: no local validation, no retries, and backend
//! errors are relayed as-is.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::RpcError;
use crate::node::GatewayConfig;
use crate::rpc::MethodRegistry;

/// Command groups forwarded when proxying is enabled. Built once, read-only.
pub const COMMAND_GROUPS: &[(&str, &[&str])] = &[
    (
        "blockchain",
        &[
            "getbestblockhash",
            "getblock",
            "getblockchaininfo",
            "getblockcount",
            "getblockhash",
            "getchaintips",
            "getdifficulty",
            "getmempoolinfo",
            "getrawmempool",
            "gettxout",
            "gettxoutsetinfo",
            "verifychain",
        ],
    ),
    ("control", &["getinfo", "help"]),
    (
        "mining",
        &[
            "getmininginfo",
            "getnetworkhashps",
            "prioritisetransaction",
            "submitblock",
        ],
    ),
    (
        "network",
        &[
            "addnode",
            "getaddednodeinfo",
            "getconnectioncount",
            "getnettotals",
            "getnetworkinfo",
            "getpeerinfo",
            "ping",
        ],
    ),
    (
        "tx",
        &[
            "createrawtransaction",
            "decoderawtransaction",
            "decodescript",
            "getrawtransaction",
            "sendrawtransaction",
            "signrawtransaction",
        ],
    ),
    (
        "util",
        &[
            "createmultisig",
            "estimatefee",
            "estimatepriority",
            "validateaddress",
            "verifymessage",
        ],
    ),
];

/// JSON-RPC client for the backend node.
pub struct BackendClient {
    url: String,
    user: String,
    password: Option<String>,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            url: config.proxy_url(),
            user: config.proxy.user.clone(),
            password: config.proxy.password.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Forward a call verbatim. The backend's result or error comes back
    /// unmodified; transport failures surface as generic errors.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let body = json!({
            "jsonrpc": "1.0",
            "id": "walletd",
            "method": method,
            "params": params,
        });
        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.user, self.password.as_deref())
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Misc(format!("backend node unreachable: {e}")))?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Misc(format!("backend node returned invalid JSON: {e}")))?;

        if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
            return Err(RpcError::Proxied(error.clone()));
        }
        Ok(payload.get("result").cloned().unwrap_or(Value::Null))
    }
}

pub fn register_proxy_methods(registry: &mut MethodRegistry, backend: Arc<BackendClient>) {
    for (group, methods) in COMMAND_GROUPS {
        for &method in *methods {
            let backend = backend.clone();
            registry.register(
                method,
                Arc::new(move |params| {
                    let backend = backend.clone();
                    Box::pin(async move { backend.call(method, params).await })
                }),
            );
        }
        tracing::info!(group, count = methods.len(), "proxying command group");
    }
}
