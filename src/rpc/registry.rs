//! Method registry - binds RPC method names to handlers
//!
//! Single entry point for the transport layer. Local and proxied handlers
//! register through the same interface; whatever they return, only
//! protocol-shaped errors leave [`MethodRegistry::dispatch`].

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::RpcError;

pub type HandlerResult = Result<Value, RpcError>;
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;
pub type Handler = Arc<dyn Fn(Vec<Value>) -> HandlerFuture + Send + Sync>;

#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<&'static str, Handler>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same name twice is a programming error, not a
    /// runtime condition.
    pub fn register(&mut self, name: &'static str, handler: Handler) {
        if self.methods.insert(name, handler).is_some() {
            panic!("RPC method registered twice: {name}");
        }
        tracing::debug!(method = name, "registered RPC method");
    }

    /// Bind a plain async fn over a shared context as a handler.
    pub fn register_fn<C, F, Fut>(&mut self, name: &'static str, ctx: &Arc<C>, f: F)
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let ctx = ctx.clone();
        self.register(
            name,
            Arc::new(move |params| Box::pin(f(ctx.clone(), params))),
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub async fn dispatch(&self, name: &str, params: Vec<Value>) -> HandlerResult {
        let handler = self
            .methods
            .get(name)
            .ok_or_else(|| RpcError::MethodNotFound(name.to_string()))?
            .clone();
        handler(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trivial(result: Value) -> Handler {
        Arc::new(move |_params| {
            let result = result.clone();
            Box::pin(async move { Ok(result) })
        })
    }

    #[tokio::test]
    async fn dispatch_resolves_registered_method() {
        let mut registry = MethodRegistry::new();
        registry.register("ping", trivial(json!("pong")));
        assert_eq!(registry.dispatch("ping", vec![]).await.unwrap(), json!("pong"));
    }

    #[tokio::test]
    async fn unknown_method_maps_to_not_found() {
        let registry = MethodRegistry::new();
        let err = registry.dispatch("nope", vec![]).await.unwrap_err();
        assert_eq!(err.code(), -32601);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn duplicate_registration_panics() {
        let mut registry = MethodRegistry::new();
        registry.register("ping", trivial(json!(1)));
        registry.register("ping", trivial(json!(2)));
    }
}
