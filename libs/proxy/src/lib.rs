//! Fanout Proxy - Scatter/gather dispatch of unary calls
//!
//! One inbound call is sent to every resolved target concurrently and the
//! per-target outcomes are merged into a single response plus a combined
//! error. Partial failure is the normal case: the response always carries
//! whatever succeeded.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fanout_core::metadata::TARGETS;
//! use fanout_core::{Metadata, MethodDescriptor, ServiceDescriptor};
//! use fanout_proxy::{IncomingCall, MethodRegistry, Proxy, ProxyConfig};
//!
//! # async fn example() {
//! let registry = MethodRegistry::builder()
//!     .service(&ServiceDescriptor::new("os", "OSService").method(MethodDescriptor::unary("Dmesg")))
//!     .build();
//! let proxy = Proxy::new(Arc::new(registry), &ProxyConfig::default());
//!
//! let metadata = Metadata::new().with(TARGETS, ["10.5.0.2", "10.5.0.3"]);
//! let call = IncomingCall::new("/os.OSService/Dmesg", metadata, Vec::new());
//! let result = proxy.proxy(call, Arc::new(fanout_fabric::Insecure)).await;
//!
//! for item in result.response.iter() {
//!     println!("{}: {} bytes", item.hostname(), item.payload.len());
//! }
//! for failure in result.failures() {
//!     eprintln!("{failure}");
//! }
//! # }
//! ```

pub mod aggregate;
pub mod client;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod interceptor;
pub mod invoker;
pub mod loop_guard;
pub mod proxy;
pub mod registrator;
pub mod registry;
pub mod resolver;
pub mod runner;

// Re-exports for convenience
pub use aggregate::{AggregateError, ErrorAggregator, FanoutResponse, ResponseAggregator, ResponseItem};
pub use client::{ClientHandle, ClientPool, Connector, DialOptions, TcpConnector};
pub use config::ProxyConfig;
pub use context::CallContext;
pub use credentials::{CredentialsProvider, StaticCredentials};
pub use error::{FailureKind, ProxyError, Result, TargetError};
pub use interceptor::ProxyInterceptor;
pub use invoker::{Invoker, UnaryInvoker};
pub use proxy::{FanoutResult, IncomingCall, Proxy};
pub use registrator::{LocalForwarder, Registrator};
pub use registry::{MethodRegistry, MethodRegistryBuilder};
pub use runner::FanoutRunner;
