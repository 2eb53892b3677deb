use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::transport::{Transport, MAX_FRAME_LEN};

/// Length-prefixed framing over any byte stream
///
/// Messages are sent with a 4-byte big-endian length prefix
pub struct FramedTransport<S> {
    stream: S,
    send_timeout: Option<Duration>,
    receive_timeout: Option<Duration>,
}

impl<S> FramedTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + Sync,
{
    /// Wrap a connected stream with no timeouts
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            send_timeout: None,
            receive_timeout: None,
        }
    }

    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn with_receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }
}

fn closed_on_eof(e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::ConnectionClosed
    } else {
        e.into()
    }
}

#[async_trait::async_trait]
impl<S> Transport for FramedTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + Sync,
{
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_FRAME_LEN {
            return Err(Error::InvalidFrame(format!(
                "Message too large: {} bytes",
                bytes.len()
            )));
        }

        let stream = &mut self.stream;
        let send_op = async {
            stream.write_u32(bytes.len() as u32).await?;
            stream.write_all(bytes).await?;
            stream.flush().await?;
            Ok::<(), Error>(())
        };

        match self.send_timeout {
            Some(timeout) => tokio::time::timeout(timeout, send_op)
                .await
                .map_err(|_| Error::Timeout("Send"))?,
            None => send_op.await,
        }
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        let stream = &mut self.stream;
        let receive_op = async {
            let len = stream.read_u32().await.map_err(closed_on_eof)? as usize;

            if len > MAX_FRAME_LEN {
                return Err(Error::InvalidFrame(format!(
                    "Message too large: {} bytes",
                    len
                )));
            }

            let mut buf = vec![0u8; len];
            stream.read_exact(&mut buf).await.map_err(closed_on_eof)?;
            Ok::<Vec<u8>, Error>(buf)
        };

        match self.receive_timeout {
            Some(timeout) => tokio::time::timeout(timeout, receive_op)
                .await
                .map_err(|_| Error::Timeout("Receive"))?,
            None => receive_op.await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
