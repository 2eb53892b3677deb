use crate::error::Result;

pub mod framed;
pub mod tcp;
pub mod unix;

pub use self::framed::FramedTransport;
pub use self::tcp::{TcpTransport, TcpTransportBuilder, TcpTransportListener};
pub use self::unix::{UnixTransport, UnixTransportBuilder, UnixTransportListener};

/// Largest frame accepted on any transport (100 MiB)
pub const MAX_FRAME_LEN: usize = 100 * 1024 * 1024;

/// Transport trait for sending and receiving raw frames
///
/// Each transport instance represents a single connection.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one frame
    async fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Receive one frame
    async fn receive(&mut self) -> Result<Vec<u8>>;

    /// Close the transport connection
    async fn close(&mut self) -> Result<()>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes).await
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        (**self).receive().await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }
}

/// Listener producing one transport per accepted connection
#[async_trait::async_trait]
pub trait TransportListener: Send + Sync {
    type Transport: Transport + 'static;

    /// Accept the next incoming connection
    async fn accept(&self) -> Result<Self::Transport>;

    /// Stop listening
    async fn close(&mut self) -> Result<()>;
}
