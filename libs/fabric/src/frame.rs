use std::time::Duration;

use fanout_core::metadata::AUTHORITY;
use fanout_core::{Metadata, Status};
use serde::{Deserialize, Serialize};

/// One unary call on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFrame {
    /// Full method name, `/package.Service/Method`
    pub method: String,
    pub metadata: Metadata,
    /// Time the caller is still willing to wait
    pub timeout: Option<Duration>,
    pub payload: Vec<u8>,
}

impl CallFrame {
    pub fn new(method: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            method: method.into(),
            metadata: Metadata::new(),
            timeout: None,
            payload,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Stamp `:authority` unless the caller already set one
    pub fn ensure_authority(&mut self, authority: &str) {
        if self.metadata.get(AUTHORITY).is_none() {
            self.metadata.set(AUTHORITY, [authority]);
        }
    }
}

/// Answer to a [`CallFrame`]
///
/// `payload` and `status` are independent: a fan-out reply carries whatever
/// succeeded together with the combined error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub payload: Vec<u8>,
    pub status: Option<Status>,
}

impl Reply {
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            payload,
            status: None,
        }
    }

    pub fn error(status: Status) -> Self {
        Self {
            payload: Vec::new(),
            status: Some(status),
        }
    }

    pub fn partial(payload: Vec<u8>, status: Option<Status>) -> Self {
        Self { payload, status }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_none()
    }

    /// Payload on success, status otherwise (dropping any partial payload)
    pub fn into_result(self) -> std::result::Result<Vec<u8>, Status> {
        match self.status {
            None => Ok(self.payload),
            Some(status) => Err(status),
        }
    }
}
