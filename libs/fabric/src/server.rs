use std::sync::Arc;
use std::time::Duration;

use fanout_core::Status;

use crate::codec::{BincodeCodec, Codec};
use crate::error::{Error, Result};
use crate::frame::{CallFrame, Reply};
use crate::transport::{Transport, TransportListener};

/// Server-side call handler
#[async_trait::async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, call: CallFrame) -> Reply;
}

#[async_trait::async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, call: CallFrame) -> Reply {
        (**self).handle(call).await
    }
}

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Accept connections forever, serving each on its own task
///
/// Accept failures such as running out of file descriptors are logged and
/// retried after a short pause.
pub async fn serve<L, H>(listener: L, handler: H)
where
    L: TransportListener,
    H: Handler,
{
    let handler = Arc::new(handler);

    loop {
        let transport = match listener.accept().await {
            Ok(transport) => transport,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        let handler = Arc::clone(&handler);

        tokio::spawn(async move {
            if let Err(e) = serve_connection(transport, handler).await {
                tracing::warn!(error = %e, "connection terminated");
            }
        });
    }
}

/// Serve frames on one connection until the peer closes it
pub async fn serve_connection<T, H>(mut transport: T, handler: H) -> Result<()>
where
    T: Transport,
    H: Handler,
{
    let codec = BincodeCodec;

    loop {
        let bytes = match transport.receive().await {
            Ok(bytes) => bytes,
            Err(Error::ConnectionClosed) => {
                tracing::trace!("connection closed by peer");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let reply = match codec.decode::<CallFrame>(&bytes) {
            Ok(call) => {
                tracing::debug!(method = %call.method, "handling call");
                handler.handle(call).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode call frame");
                Reply::error(Status::internal(e.to_string()))
            }
        };

        transport.send(&codec.encode(&reply)?).await?;
    }
}
