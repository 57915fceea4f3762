//! Gateway - the process object tying session, wallet API and registry

mod config;

pub use config::{GatewayConfig, Network, ProxyConfig};

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::WalletApi;
use crate::error::RpcError;
use crate::proxy::{self, BackendClient};
use crate::rpc::{self, MethodRegistry};
use crate::session::Session;

/// One gateway per process: one session, one wallet API client, one method
/// registry. Session mutation is serialized behind the lock; the protocol
/// itself remains single-tenant.
pub struct Gateway {
    pub(crate) config: GatewayConfig,
    pub(crate) session: RwLock<Session>,
    pub(crate) api: Arc<dyn WalletApi>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, api: Arc<dyn WalletApi>) -> Arc<Self> {
        Arc::new(Self {
            config,
            session: RwLock::new(Session::default()),
            api,
        })
    }

    /// Build the method registry: local wallet methods, plus the proxied
    /// command groups when proxying is enabled.
    pub fn registry(self: &Arc<Self>) -> MethodRegistry {
        let mut registry = MethodRegistry::new();
        rpc::register_wallet_methods(&mut registry, self);
        if self.config.proxy.enabled {
            let backend = Arc::new(BackendClient::new(&self.config));
            proxy::register_proxy_methods(&mut registry, backend);
        }
        registry
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Session token and active wallet id, or `NotConnected`.
    pub(crate) async fn active_wallet(&self) -> Result<(String, String), RpcError> {
        let session = self.session.read().await;
        let wallet = session.require_wallet()?;
        Ok((session.token(), wallet.id.clone()))
    }

    pub async fn active_wallet_id(&self) -> Option<String> {
        self.session.read().await.wallet.as_ref().map(|w| w.id.clone())
    }

    pub async fn has_keychain(&self) -> bool {
        self.session.read().await.keychain.is_some()
    }
}
