//! Wallet service boundary - typed records, tagged errors, async trait
//!
//! The hosted wallet API is the only source of truth for balances, addresses,
//! unspents and transaction construction. Everything it returns is validated
//! into the record types here before the RPC layer touches it.

mod client;

pub use client::HttpWalletApi;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::error::RpcError;
use crate::session::Keychain;

/// Wallet service failure, tagged. The HTTP client classifies upstream
/// free-text messages into these variants; everything downstream matches on
/// the tag, never on message content.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("{0}")]
    InvalidAddress(String),
    #[error("{0}")]
    InvalidAmount(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Compatibility shim: the service reports transaction failures as free
    /// text. Matching is case-sensitive substring matching, inherited from
    /// the upstream message format.
    pub fn classify(message: String) -> Self {
        if message == "Insufficient funds" {
            return ApiError::InsufficientFunds;
        }
        if message.contains("invalid bitcoin address") {
            return ApiError::InvalidAddress(message);
        }
        if message.contains("invalid amount") {
            return ApiError::InvalidAmount(message);
        }
        ApiError::Other(message)
    }
}

impl From<ApiError> for RpcError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InsufficientFunds => RpcError::InsufficientFunds,
            ApiError::InvalidAddress(m) => RpcError::InvalidAddress(m),
            ApiError::InvalidAmount(m) => RpcError::InvalidAmount(m),
            ApiError::Auth(m) => RpcError::Auth(m),
            ApiError::NotFound(m) => RpcError::NotFound(m),
            ApiError::Other(m) => RpcError::Misc(m),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
}

/// Remote wallet handle. Balances are integral satoshis.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteWallet {
    pub id: String,
    #[serde(default)]
    pub balance: i64,
    #[serde(rename = "confirmedBalance", default)]
    pub confirmed_balance: i64,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AddressRecord {
    pub address: String,
    #[serde(default)]
    pub chain: u32,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub path: String,
}

/// Public keychain record on file with the wallet service.
#[derive(Debug, Clone, Deserialize)]
pub struct KeychainRecord {
    pub xpub: String,
    #[serde(default)]
    pub path: String,
}

/// One unspent output as the wallet service reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUnspent {
    pub tx_hash: String,
    pub tx_output_n: u32,
    pub address: String,
    pub script: String,
    #[serde(rename = "redeemScript")]
    pub redeem_script: Option<String>,
    pub value: i64,
    pub confirmations: i64,
}

/// Ledger entry: signed net effect of a transaction on one account.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerEntry {
    pub account: String,
    pub value: i64,
}

/// One output leg of a wallet transaction. `account` is the destination
/// address; `is_mine` flags outputs paying back into the wallet.
#[derive(Debug, Clone, Deserialize)]
pub struct TxOutput {
    pub account: String,
    pub value: i64,
    #[serde(rename = "isMine", default)]
    pub is_mine: bool,
    pub vout: u32,
}

/// Wallet transaction as reported upstream, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTransaction {
    pub id: String,
    pub entries: Vec<LedgerEntry>,
    pub outputs: Vec<TxOutput>,
    /// Network fee in satoshis, meaningful on spends.
    #[serde(default)]
    pub fee: i64,
    pub confirmations: i64,
    pub blockhash: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendResult {
    pub hash: String,
}

/// The remote custodial service. One implementation speaks HTTP
/// ([`HttpWalletApi`]); tests substitute their own.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Profile of the user the token authenticates.
    async fn current_user(&self, token: &str) -> Result<UserProfile, ApiError>;

    /// Fetch a wallet by id, balances included.
    async fn get_wallet(&self, token: &str, id: &str) -> Result<RemoteWallet, ApiError>;

    /// Look up the public keychain record matching a derived xpub.
    async fn get_keychain(&self, token: &str, xpub: &str) -> Result<KeychainRecord, ApiError>;

    /// Forward a one-time passcode to the session-unlock call.
    async fn unlock_session(&self, token: &str, otp: &str) -> Result<(), ApiError>;

    /// Derive a fresh receiving address for the wallet.
    async fn create_address(&self, token: &str, wallet_id: &str)
        -> Result<AddressRecord, ApiError>;

    /// All unspent outputs of the wallet.
    async fn unspents(&self, token: &str, wallet_id: &str)
        -> Result<Vec<RemoteUnspent>, ApiError>;

    /// The wallet's transaction list, newest first.
    async fn transactions(
        &self,
        token: &str,
        wallet_id: &str,
    ) -> Result<Vec<RemoteTransaction>, ApiError>;

    /// Build, sign and broadcast a transaction paying `recipients`
    /// (address to satoshis). Returns the broadcast transaction hash.
    async fn send(
        &self,
        token: &str,
        wallet_id: &str,
        keychain: &Keychain,
        recipients: &BTreeMap<String, i64>,
        message: Option<&str>,
    ) -> Result<SendResult, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_exact_insufficient_funds() {
        assert!(matches!(
            ApiError::classify("Insufficient funds".into()),
            ApiError::InsufficientFunds
        ));
        // Substring is not enough for this one; the match is exact.
        assert!(matches!(
            ApiError::classify("error: Insufficient funds in wallet".into()),
            ApiError::Other(_)
        ));
    }

    #[test]
    fn classify_substrings_are_case_sensitive() {
        assert!(matches!(
            ApiError::classify("sorry, invalid bitcoin address: 3abc".into()),
            ApiError::InvalidAddress(_)
        ));
        assert!(matches!(
            ApiError::classify("Invalid Bitcoin Address".into()),
            ApiError::Other(_)
        ));
        assert!(matches!(
            ApiError::classify("request had an invalid amount".into()),
            ApiError::InvalidAmount(_)
        ));
    }
}
