use fanout_core::metadata::AUTHORITY;
use fanout_fabric::codec::{BincodeCodec, Codec};
use fanout_fabric::{CallFrame, Error, Reply};

use crate::client::ClientHandle;

/// Calls one method on one client
///
/// Hides the per-method binding so fan-out stays method-agnostic.
#[async_trait::async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(
        &self,
        client: &mut ClientHandle,
        request: &[u8],
    ) -> fanout_fabric::Result<Vec<u8>>;
}

/// Forwards a unary call unchanged to the client's target
#[derive(Debug, Clone)]
pub struct UnaryInvoker {
    method: String,
}

impl UnaryInvoker {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

#[async_trait::async_trait]
impl Invoker for UnaryInvoker {
    async fn invoke(
        &self,
        client: &mut ClientHandle,
        request: &[u8],
    ) -> fanout_fabric::Result<Vec<u8>> {
        let context = client.context();
        if context.is_expired() {
            return Err(Error::Timeout("Call"));
        }
        let deadline = context.deadline;

        let mut metadata = context.metadata.clone();
        metadata.set(AUTHORITY, [client.target().host()]);

        let frame = CallFrame {
            method: self.method.clone(),
            metadata,
            timeout: context.remaining(),
            payload: request.to_vec(),
        };

        let codec = BincodeCodec;
        let bytes = codec.encode(&frame)?;
        let transport = client.transport_mut();

        let call = async {
            transport.send(&bytes).await?;
            let reply: Reply = codec.decode(&transport.receive().await?)?;
            reply.into_result().map_err(Error::Status)
        };

        match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, call)
                .await
                .map_err(|_| Error::Timeout("Call"))?,
            None => call.await,
        }
    }
}
