use std::sync::Arc;

use fanout_core::{MethodName, Status};
use fanout_fabric::codec::{BincodeCodec, Codec};
use fanout_fabric::{CallFrame, Handler, Reply};

use crate::credentials::CredentialsProvider;
use crate::error::ProxyError;
use crate::loop_guard;
use crate::proxy::{FanoutResult, IncomingCall, Proxy};

/// Server entry point deciding between fan-out and local handling
///
/// Calls outside the configured scope, and calls already fanned out by
/// another node, go straight to the local handler.
pub struct ProxyInterceptor<L> {
    proxy: Proxy,
    credentials: Arc<dyn CredentialsProvider>,
    local: L,
    scope: Option<String>,
}

impl<L: Handler> ProxyInterceptor<L> {
    pub fn new(proxy: Proxy, credentials: Arc<dyn CredentialsProvider>, local: L) -> Self {
        Self {
            proxy,
            credentials,
            local,
            scope: None,
        }
    }

    /// Restrict fan-out to a `package` or `package.Service`
    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope;
        self
    }

    fn in_scope(&self, method: &str) -> bool {
        let Some(scope) = &self.scope else {
            return true;
        };

        match method.parse::<MethodName>() {
            Ok(name) => name.service() == scope || name.package() == scope,
            Err(_) => false,
        }
    }

    fn encode(result: FanoutResult) -> Reply {
        let (response, error) = result.into_parts();
        let status = error.as_ref().map(ProxyError::to_status);

        match BincodeCodec.encode(&response) {
            Ok(payload) => Reply::partial(payload, status),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode fan-out response");
                Reply::error(Status::internal(e.to_string()))
            }
        }
    }
}

#[async_trait::async_trait]
impl<L: Handler> Handler for ProxyInterceptor<L> {
    async fn handle(&self, call: CallFrame) -> Reply {
        if !self.in_scope(&call.method) {
            return self.local.handle(call).await;
        }

        if loop_guard::is_proxied(&call.metadata) {
            tracing::debug!(method = %call.method, "already proxied, handling locally");
            return self.local.handle(call).await;
        }

        let credentials = match self.credentials.credentials().await {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(error = %e, "no credentials for fan-out");
                return Reply::error(ProxyError::Credentials(e.to_string()).to_status());
            }
        };

        let result = self.proxy.proxy(IncomingCall::from(call), credentials).await;
        Self::encode(result)
    }
}
