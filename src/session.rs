//! Session - auth token, active wallet, signing keychain
//!
//! One session per process, matching the protocol's one-wallet-per-node
//! model. Handlers thread the session through explicitly; mutation is
//! serialized behind a single writer lock in the gateway.

use crate::api::{KeychainRecord, RemoteWallet};
use crate::error::RpcError;

/// Validated signing keychain: the operator-supplied xprv attached to the
/// wallet service's public keychain record.
#[derive(Debug, Clone)]
pub struct Keychain {
    pub xprv: String,
    pub xpub: String,
    pub record: KeychainRecord,
}

#[derive(Debug, Default)]
pub struct Session {
    pub token: Option<String>,
    pub wallet: Option<RemoteWallet>,
    pub keychain: Option<Keychain>,
}

impl Session {
    pub fn require_wallet(&self) -> Result<&RemoteWallet, RpcError> {
        self.wallet.as_ref().ok_or(RpcError::NotConnected)
    }

    pub fn require_keychain(&self) -> Result<&Keychain, RpcError> {
        self.keychain.as_ref().ok_or(RpcError::NoKeychain)
    }

    /// Token for upstream calls. An unauthenticated session sends the empty
    /// token and lets the wallet service reject it.
    pub fn token(&self) -> String {
        self.token.clone().unwrap_or_default()
    }

    /// Replacing the keychain discards the previous one immediately.
    pub fn set_keychain(&mut self, keychain: Option<Keychain>) {
        self.keychain = keychain;
    }
}
