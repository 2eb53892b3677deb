use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use fanout_core::{ServiceDescriptor, Status};
use fanout_fabric::codec::BincodeCodec;
use fanout_fabric::request::call_unix;
use fanout_fabric::{CallFrame, Handler, Reply};

/// Routes calls handled on this node
#[derive(Default, Clone)]
pub struct Registrator {
    routes: HashMap<String, Arc<dyn Handler>>,
}

impl Registrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one full method name
    pub fn route(mut self, method: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.routes.insert(method.into(), handler);
        self
    }

    /// Route every unary method of a service to the same handler
    pub fn service(mut self, service: &ServiceDescriptor, handler: Arc<dyn Handler>) -> Self {
        for method in service.methods.iter().filter(|m| !m.is_streaming()) {
            self.routes
                .insert(service.full_method_name(method), Arc::clone(&handler));
        }
        self
    }

    pub fn contains(&self, method: &str) -> bool {
        self.routes.contains_key(method)
    }
}

#[async_trait::async_trait]
impl Handler for Registrator {
    async fn handle(&self, call: CallFrame) -> Reply {
        match self.routes.get(&call.method) {
            Some(handler) => handler.handle(call).await,
            None => Reply::error(Status::unimplemented(format!(
                "unknown method {}",
                call.method
            ))),
        }
    }
}

/// Hands calls to a node-local service over a Unix socket
#[derive(Debug, Clone)]
pub struct LocalForwarder {
    path: PathBuf,
}

impl LocalForwarder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl Handler for LocalForwarder {
    async fn handle(&self, call: CallFrame) -> Reply {
        match call_unix(&self.path, &call, BincodeCodec).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), method = %call.method, error = %e, "local service unreachable");
                Reply::error(e.into_status())
            }
        }
    }
}
