//! HTTP routes for the JSON-RPC endpoint

use axum::{extract::State, response::IntoResponse, routing::{get, post}, Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::RpcError;
use crate::rpc::{JsonRpcRequest, JsonRpcResponse, MethodRegistry};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MethodRegistry>,
}

pub fn create_router(registry: Arc<MethodRegistry>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", post(handle_rpc))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { registry })
}

async fn health(State(s): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "methods": s.registry.len()}))
}

async fn handle_rpc(
    State(s): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    let id = request.id.clone();
    let params = match request.params {
        Value::Array(params) => params,
        Value::Null => Vec::new(),
        _ => {
            return Json(JsonRpcResponse::failure(
                id,
                RpcError::InvalidParameter("params must be a positional array".into()),
            ))
        }
    };

    tracing::debug!(method = %request.method, "rpc call");
    match s.registry.dispatch(&request.method, params).await {
        Ok(result) => Json(JsonRpcResponse::result(id, result)),
        Err(err) => {
            tracing::debug!(method = %request.method, code = err.code(), "rpc error");
            Json(JsonRpcResponse::failure(id, err))
        }
    }
}
