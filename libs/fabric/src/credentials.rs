use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error::Result;

/// Byte stream a transport can frame over
pub trait IoStream: AsyncRead + AsyncWrite + Unpin + Send + Sync {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + Sync> IoStream for T {}

pub type BoxedStream = Box<dyn IoStream>;

/// Client-side transport security
///
/// Implementations wrap a freshly connected TCP stream, typically with a TLS
/// handshake against `authority`. Certificate material stays inside the
/// implementation.
#[async_trait::async_trait]
pub trait TransportCredentials: Send + Sync {
    /// Short protocol name used in logs, e.g. `tls`
    fn protocol(&self) -> &'static str;

    /// Secure a connected stream
    async fn secure(&self, stream: TcpStream, authority: &str) -> Result<BoxedStream>;
}

/// Plain TCP without transport security
#[derive(Debug, Clone, Copy, Default)]
pub struct Insecure;

#[async_trait::async_trait]
impl TransportCredentials for Insecure {
    fn protocol(&self) -> &'static str {
        "insecure"
    }

    async fn secure(&self, stream: TcpStream, _authority: &str) -> Result<BoxedStream> {
        Ok(Box::new(stream))
    }
}
