//! walletd: bitcoind-compatible JSON-RPC gateway for a hosted custodial
//! wallet service.
//!
//! # Architecture
//!
//! ```text
//! Gateway (entry point)
//!   │
//!   ├── MethodRegistry (dispatch: method name → handler)
//!   │     ├── local wallet handlers → Session + WalletApi
//!   │     └── proxied command groups → BackendClient (bitcoind)
//!   │
//!   ├── Session (auth token, active wallet, signing keychain)
//!   │
//!   └── WalletApi (hosted wallet service over HTTP)
//! ```
//!
//! Existing bitcoind tooling points at the gateway's listen port and keeps
//! working: wallet methods (`getbalance`, `listunspent`, `sendtoaddress`,
//! `listtransactions`, ...) are answered from the wallet service, and a
//! fixed allow-list of read-only/network methods is forwarded verbatim to a
//! real bitcoind backend.
//!
//! # Usage
//!
//! ```ignore
//! use walletd::{Gateway, GatewayConfig, HttpWalletApi, Network};
//! use std::sync::Arc;
//!
//! let config = GatewayConfig::new(Network::Testnet)
//!     .with_api_url("https://wallets.example.com");
//! let api = Arc::new(HttpWalletApi::new(config.api_url().unwrap()));
//! let gateway = Gateway::new(config, api);
//! let registry = Arc::new(gateway.registry());
//! let router = walletd::create_router(registry);
//! // axum::serve(listener, router) ...
//! ```

pub mod amount;
pub mod api;
pub mod error;
pub mod logging;
pub mod node;
pub mod proxy;
pub mod rpc;
pub mod server;
pub mod session;

pub use api::{HttpWalletApi, WalletApi};
pub use error::RpcError;
pub use logging::init_logging;
pub use node::{Gateway, GatewayConfig, Network, ProxyConfig};
pub use proxy::BackendClient;
pub use rpc::{JsonRpcRequest, JsonRpcResponse, MethodRegistry};
pub use server::create_router;
pub use session::{Keychain, Session};
