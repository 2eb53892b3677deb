use std::path::Path;

use crate::channel::Channel;
use crate::codec::Codec;
use crate::error::Result;
use crate::frame::{CallFrame, Reply};
use crate::transport::TcpTransport;

/// Perform a one-off TCP call
///
/// Opens a connection, sends the call, receives the reply, and closes the
/// connection. `:authority` defaults to `host`.
pub async fn call_tcp<C: Codec>(
    host: &str,
    port: u16,
    mut frame: CallFrame,
    codec: C,
) -> Result<Reply> {
    frame.ensure_authority(host);

    let builder = TcpTransport::builder().host(host).port(port);
    let mut channel = Channel::tcp(builder, codec).await?;
    let reply = channel.call(&frame).await?;
    channel.close().await?;
    Ok(reply)
}

/// Perform a one-off Unix socket call
pub async fn call_unix<C: Codec>(
    path: impl AsRef<Path>,
    frame: &CallFrame,
    codec: C,
) -> Result<Reply> {
    let mut channel = Channel::unix(path, codec).await?;
    let reply = channel.call(frame).await?;
    channel.close().await?;
    Ok(reply)
}
