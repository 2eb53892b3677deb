//! Fanout Fabric - Wire layer for the fan-out proxy
//!
//! Provides framed transports (TCP secured by pluggable credentials, Unix
//! sockets), the bincode codec, call/reply frames, and a small frame server
//! for node-to-node calls.
//!
//! # Example
//!
//! ```no_run
//! use fanout_fabric::{codec::BincodeCodec, request::call_tcp, CallFrame};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = CallFrame::new("/os.OSService/Dmesg", Vec::new());
//! let reply = call_tcp("10.5.0.2", 50000, frame, BincodeCodec).await?;
//! let payload = reply.into_result()?;
//! # let _ = payload;
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod codec;
pub mod credentials;
pub mod error;
pub mod frame;
pub mod request;
pub mod server;
pub mod transport;

// Re-exports for convenience
pub use channel::Channel;
pub use credentials::{Insecure, TransportCredentials};
pub use error::{Error, Result};
pub use frame::{CallFrame, Reply};
pub use server::Handler;
