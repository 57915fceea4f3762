//! RPC error taxonomy - every domain failure carries its bitcoind wire code

use serde_json::Value;
use thiserror::Error;

/// Failures that can leave a method handler. Converted to the JSON-RPC
/// `{code, message}` error object exactly once, at the dispatch boundary.
#[derive(Debug, Error)]
pub enum RpcError {
    /// No active wallet selected (`setwallet` not called yet).
    #[error("Not connected to wallet")]
    NotConnected,

    /// Funds movement attempted without a loaded signing keychain.
    #[error("No keychain")]
    NoKeychain,

    /// Credential or OTP rejected by the wallet service.
    #[error("{0}")]
    Auth(String),

    /// Malformed extended private key, or derived public key mismatch.
    #[error("Invalid keychain xprv")]
    InvalidKeychain,

    /// Referenced wallet or keychain does not exist upstream.
    #[error("{0}")]
    NotFound(String),

    /// Non-numeric or non-integral value where an integer was expected.
    #[error("{0}")]
    TypeMismatch(String),

    /// Confirmation threshold outside the supported {0, 1} set.
    #[error("unsupported minconf value")]
    UnsupportedValue,

    /// Invalid parameter (negative count/from), bitcoind code -8.
    #[error("{0}")]
    InvalidParameter(String),

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("{0}")]
    InvalidAddress(String),

    #[error("{0}")]
    InvalidAmount(String),

    /// Unknown method name, JSON-RPC standard code -32601.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Anything else: generic bitcoind failure, code -1.
    #[error("{0}")]
    Misc(String),

    /// Error object relayed verbatim from the proxied backend node.
    /// Bypasses local mapping entirely.
    #[error("backend error")]
    Proxied(Value),
}

impl RpcError {
    pub fn code(&self) -> i64 {
        match self {
            RpcError::InvalidAmount(_) => -3,
            RpcError::NotFound(_) | RpcError::InvalidAddress(_) => -5,
            RpcError::InsufficientFunds => -6,
            RpcError::InvalidParameter(_) => -8,
            RpcError::MethodNotFound(_) => -32601,
            RpcError::Proxied(err) => err.get("code").and_then(Value::as_i64).unwrap_or(-1),
            _ => -1,
        }
    }

    /// Wire shape for the JSON-RPC `error` member. Proxied errors pass
    /// through byte-for-byte.
    pub fn into_wire(self) -> Value {
        match self {
            RpcError::Proxied(err) => err,
            other => serde_json::json!({
                "code": other.code(),
                "message": other.to_string(),
            }),
        }
    }
}
