use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};

use crate::credentials::{BoxedStream, Insecure, TransportCredentials};
use crate::error::{Error, Result};
use crate::transport::FramedTransport;

/// TCP transport, optionally secured by [`TransportCredentials`]
pub type TcpTransport = FramedTransport<BoxedStream>;

impl FramedTransport<BoxedStream> {
    /// Connect to a remote TCP address without credentials or timeouts
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        Self::builder()
            .host(addr.ip().to_string())
            .port(addr.port())
            .connect()
            .await
    }

    /// Create a builder for configuring the transport
    pub fn builder() -> TcpTransportBuilder {
        TcpTransportBuilder::new()
    }

    /// Wrap an accepted or otherwise connected stream
    pub fn from_stream(stream: TcpStream) -> Self {
        FramedTransport::new(Box::new(stream) as BoxedStream)
    }
}

/// TCP listener for accepting incoming connections
pub struct TcpTransportListener {
    listener: TcpListener,
}

impl TcpTransportListener {
    /// Bind to a local address
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// Accept an incoming connection
    pub async fn accept(&self) -> Result<(TcpTransport, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await?;
        stream.set_nodelay(true)?;
        Ok((TcpTransport::from_stream(stream), addr))
    }

    /// Get the local address this listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(Into::into)
    }
}

#[async_trait::async_trait]
impl crate::transport::TransportListener for TcpTransportListener {
    type Transport = TcpTransport;

    async fn accept(&self) -> Result<Self::Transport> {
        let (transport, _) = TcpTransportListener::accept(self).await?;
        Ok(transport)
    }

    async fn close(&mut self) -> Result<()> {
        // Tokio's TcpListener stops listening on drop
        Ok(())
    }
}

/// Builder for configuring TCP transport
pub struct TcpTransportBuilder {
    host: Option<String>,
    port: u16,
    credentials: Arc<dyn TransportCredentials>,
    connect_timeout: Option<Duration>,
    send_timeout: Option<Duration>,
    receive_timeout: Option<Duration>,
}

impl Default for TcpTransportBuilder {
    fn default() -> Self {
        Self {
            host: None,
            port: 0,
            credentials: Arc::new(Insecure),
            connect_timeout: None,
            send_timeout: None,
            receive_timeout: None,
        }
    }
}

impl TcpTransportBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host name or IP to connect to
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port to connect to
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the credentials used to secure the connection
    pub fn credentials(mut self, credentials: Arc<dyn TransportCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the connection timeout, covering the credentials handshake
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the send timeout
    pub fn send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Set the receive timeout
    pub fn receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Connect with the configured settings
    pub async fn connect(self) -> Result<TcpTransport> {
        let host = self
            .host
            .ok_or_else(|| Error::Custom("Host not set".to_string()))?;
        let port = self.port;
        let credentials = self.credentials;

        let connect_op = async {
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            stream.set_nodelay(true)?;
            let secured = credentials.secure(stream, &host).await?;
            Ok::<BoxedStream, Error>(secured)
        };

        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, connect_op)
                .await
                .map_err(|_| Error::Timeout("Connect"))??,
            None => connect_op.await?,
        };

        tracing::trace!(%host, port, protocol = credentials.protocol(), "tcp transport connected");

        Ok(FramedTransport::new(stream)
            .with_send_timeout(self.send_timeout)
            .with_receive_timeout(self.receive_timeout))
    }
}
