//! JSON-RPC surface - wire types, method registry, handlers, history

mod handlers;
mod history;
mod registry;
mod types;

pub use handlers::register_wallet_methods;
pub use history::{reconstruct, HistoryEntry};
pub use registry::{Handler, HandlerFuture, HandlerResult, MethodRegistry};
pub use types::{JsonRpcRequest, JsonRpcResponse};
