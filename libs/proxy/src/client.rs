use std::sync::Arc;
use std::time::Duration;

use fanout_core::Target;
use fanout_fabric::transport::{TcpTransport, Transport};
use fanout_fabric::{Error, TransportCredentials};
use futures::future::join_all;

use crate::aggregate::{AggregateError, ErrorAggregator};
use crate::context::CallContext;
use crate::error::TargetError;

/// Port every node serves the API on
pub const DEFAULT_BACKEND_PORT: u16 = 50000;

/// How targets are dialed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialOptions {
    pub port: u16,
    pub connect_timeout: Option<Duration>,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_BACKEND_PORT,
            connect_timeout: None,
        }
    }
}

/// Connection to one target, owned by a single invocation
pub struct ClientHandle {
    target: Target,
    transport: Box<dyn Transport>,
    context: CallContext,
    dial: DialOptions,
}

impl ClientHandle {
    pub fn new(
        target: Target,
        transport: Box<dyn Transport>,
        context: CallContext,
        dial: DialOptions,
    ) -> Self {
        Self {
            target,
            transport,
            context,
            dial,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn context(&self) -> &CallContext {
        &self.context
    }

    pub fn dial_options(&self) -> &DialOptions {
        &self.dial
    }

    pub fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    /// Shut the connection down
    ///
    /// Dropping a handle also releases the socket; this just does it politely.
    pub async fn close(mut self) {
        if let Err(e) = self.transport.close().await {
            tracing::debug!(node = %self.target, error = %e, "closing client connection failed");
        }
    }
}

/// Opens transports to targets
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        target: &Target,
        credentials: Arc<dyn TransportCredentials>,
        dial: &DialOptions,
    ) -> fanout_fabric::Result<Box<dyn Transport>>;
}

/// Dials targets over TCP at the configured port
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait::async_trait]
impl Connector for TcpConnector {
    async fn connect(
        &self,
        target: &Target,
        credentials: Arc<dyn TransportCredentials>,
        dial: &DialOptions,
    ) -> fanout_fabric::Result<Box<dyn Transport>> {
        let (host, port) = target.host_port(dial.port);
        let transport = TcpTransport::builder()
            .host(host)
            .port(port)
            .credentials(credentials)
            .connect_timeout(dial.connect_timeout)
            .connect()
            .await?;
        Ok(Box::new(transport))
    }
}

/// Creates fresh per-invocation clients
#[derive(Clone)]
pub struct ClientPool {
    connector: Arc<dyn Connector>,
    dial: DialOptions,
}

impl ClientPool {
    pub fn new(connector: Arc<dyn Connector>, dial: DialOptions) -> Self {
        Self { connector, dial }
    }

    pub fn tcp(dial: DialOptions) -> Self {
        Self::new(Arc::new(TcpConnector), dial)
    }

    pub fn dial_options(&self) -> &DialOptions {
        &self.dial
    }

    /// Dial every target
    ///
    /// Dials run concurrently and all finish before this returns. A target
    /// that cannot be reached is recorded in the returned error and left out
    /// of the handles; the remaining targets are unaffected. The deadline of
    /// `context`, if any, bounds each dial.
    pub async fn create(
        &self,
        targets: &[Target],
        credentials: Arc<dyn TransportCredentials>,
        context: &CallContext,
    ) -> (Vec<ClientHandle>, Option<AggregateError>) {
        let dials = targets.iter().map(|target| {
            let credentials = Arc::clone(&credentials);
            async move {
                let result = self.dial_one(target, credentials, context).await;
                (target, result)
            }
        });

        let mut handles = Vec::with_capacity(targets.len());
        let mut errors = ErrorAggregator::new();

        for (target, result) in join_all(dials).await {
            match result {
                Ok(transport) => {
                    tracing::debug!(node = %target, "dialed target");
                    handles.push(ClientHandle::new(
                        target.clone(),
                        transport,
                        context.clone(),
                        self.dial.clone(),
                    ));
                }
                Err(e) => {
                    tracing::warn!(node = %target, error = %e, "failed to dial target");
                    errors.push(TargetError::dial(target.clone(), e));
                }
            }
        }

        (handles, errors.finish())
    }

    async fn dial_one(
        &self,
        target: &Target,
        credentials: Arc<dyn TransportCredentials>,
        context: &CallContext,
    ) -> fanout_fabric::Result<Box<dyn Transport>> {
        let connect = self.connector.connect(target, credentials, &self.dial);

        match context.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, connect)
                .await
                .map_err(|_| Error::Timeout("Connect"))?,
            None => connect.await,
        }
    }
}
