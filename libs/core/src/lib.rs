//! Fanout Core - Shared vocabulary for the fan-out proxy
//!
//! Call metadata, method names and descriptors, wire status codes and
//! target identities used by both the fabric and the proxy crates.

pub mod error;
pub mod metadata;
pub mod method;
pub mod status;
pub mod target;

pub use error::{Error, Result};
pub use metadata::Metadata;
pub use method::{MethodDescriptor, MethodName, ServiceDescriptor};
pub use status::{Code, Status};
pub use target::{NodeMetadata, Target};
