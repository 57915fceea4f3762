//! HTTP transport - axum router exposing the JSON-RPC endpoint

mod routes;

pub use routes::{create_router, AppState};
