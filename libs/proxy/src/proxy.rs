use std::sync::Arc;

use fanout_core::Metadata;
use fanout_fabric::{CallFrame, TransportCredentials};
use tokio::time::Instant;

use crate::aggregate::{ErrorAggregator, FanoutResponse, ResponseAggregator};
use crate::client::{ClientPool, Connector, DialOptions};
use crate::config::ProxyConfig;
use crate::context::CallContext;
use crate::error::{ProxyError, TargetError};
use crate::loop_guard;
use crate::registry::MethodRegistry;
use crate::resolver::resolve_targets;
use crate::runner::FanoutRunner;

/// Inbound unary call as seen by the proxy
#[derive(Debug, Clone)]
pub struct IncomingCall {
    pub method: String,
    pub metadata: Metadata,
    pub deadline: Option<Instant>,
    pub payload: Vec<u8>,
}

impl IncomingCall {
    pub fn new(method: impl Into<String>, metadata: Metadata, payload: Vec<u8>) -> Self {
        Self {
            method: method.into(),
            metadata,
            deadline: None,
            payload,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl From<CallFrame> for IncomingCall {
    /// The frame's remaining timeout becomes a deadline measured from now
    ///
    /// A timeout too large to represent means no deadline.
    fn from(frame: CallFrame) -> Self {
        Self {
            deadline: frame
                .timeout
                .and_then(|timeout| Instant::now().checked_add(timeout)),
            method: frame.method,
            metadata: frame.metadata,
            payload: frame.payload,
        }
    }
}

/// Outcome of one invocation
///
/// `response` holds every item that succeeded, even when `error` is set.
#[derive(Debug)]
pub struct FanoutResult {
    pub response: FanoutResponse,
    pub error: Option<ProxyError>,
}

impl FanoutResult {
    fn rejected(error: ProxyError) -> Self {
        Self {
            response: FanoutResponse::default(),
            error: Some(error),
        }
    }

    /// Per-target failures, empty for whole-request errors
    pub fn failures(&self) -> &[TargetError] {
        self.error
            .as_ref()
            .map(ProxyError::target_errors)
            .unwrap_or(&[])
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_parts(self) -> (FanoutResponse, Option<ProxyError>) {
        (self.response, self.error)
    }
}

/// Scatter/gather dispatcher
#[derive(Clone)]
pub struct Proxy {
    registry: Arc<MethodRegistry>,
    pool: ClientPool,
}

impl Proxy {
    /// Proxy dialing targets over TCP
    pub fn new(registry: Arc<MethodRegistry>, config: &ProxyConfig) -> Self {
        Self {
            registry,
            pool: ClientPool::tcp(config.dial_options()),
        }
    }

    pub fn with_connector(
        registry: Arc<MethodRegistry>,
        connector: Arc<dyn Connector>,
        dial: DialOptions,
    ) -> Self {
        Self {
            registry,
            pool: ClientPool::new(connector, dial),
        }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// Fan `call` out to its targets and merge the outcomes
    ///
    /// Missing targets and unresolvable methods are rejected before anything
    /// is dialed. Past that point failures are per target and only shrink
    /// the response.
    pub async fn proxy(
        &self,
        call: IncomingCall,
        credentials: Arc<dyn TransportCredentials>,
    ) -> FanoutResult {
        let targets = resolve_targets(&call.metadata);
        if targets.is_empty() {
            return FanoutResult::rejected(ProxyError::InvalidRequest(
                "no targets and no authority in metadata".to_string(),
            ));
        }

        let invoker = match self.registry.lookup(&call.method) {
            Ok(invoker) => invoker,
            Err(e) => {
                tracing::debug!(method = %call.method, error = %e, "rejecting call");
                return FanoutResult::rejected(e);
            }
        };

        let context = CallContext::new(loop_guard::outgoing_metadata(&call.metadata))
            .with_deadline(call.deadline);

        let (clients, dial_errors) = self.pool.create(&targets, credentials, &context).await;
        let (items, call_errors) = FanoutRunner::new(&call.method)
            .run(clients, Arc::from(call.payload), invoker)
            .await;

        let response = ResponseAggregator::merge(items);
        let mut errors = ErrorAggregator::new();
        errors.extend(dial_errors);
        errors.extend(call_errors);

        tracing::info!(
            method = %call.method,
            targets = targets.len(),
            succeeded = response.len(),
            failed = errors.len(),
            "fan-out finished"
        );

        FanoutResult {
            response,
            error: errors.finish().map(ProxyError::Aggregate),
        }
    }
}
