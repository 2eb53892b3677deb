use std::fmt;

use fanout_core::{Code, Status, Target};
use thiserror::Error;

/// Stage at which a single target failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Dial,
    Call,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Dial => f.write_str("dial"),
            FailureKind::Call => f.write_str("call"),
        }
    }
}

/// Failure of one target, never fatal to the invocation
#[derive(Error, Debug)]
#[error("{kind} {target}: {source}")]
pub struct TargetError {
    pub target: Target,
    pub kind: FailureKind,
    #[source]
    pub source: fanout_fabric::Error,
}

impl TargetError {
    pub fn dial(target: Target, source: fanout_fabric::Error) -> Self {
        Self {
            target,
            kind: FailureKind::Dial,
            source,
        }
    }

    pub fn call(target: Target, source: fanout_fabric::Error) -> Self {
        Self {
            target,
            kind: FailureKind::Call,
            source,
        }
    }

    /// Wire status naming the target
    pub fn to_status(&self) -> Status {
        let status = match &self.source {
            fanout_fabric::Error::Status(remote) => {
                Status::new(remote.code, format!("{}: {}", self.kind, remote.message))
            }
            other => {
                let code = match (self.kind, other) {
                    (_, fanout_fabric::Error::Timeout(_)) => Code::DeadlineExceeded,
                    (FailureKind::Dial, _) => Code::Unavailable,
                    (FailureKind::Call, _) => Code::Unknown,
                };
                Status::new(code, format!("{}: {}", self.kind, other))
            }
        };
        status.with_target(self.target.host())
    }
}

/// Whole-request failures plus the combined per-target failure
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unimplemented method: {0}")]
    Unimplemented(String),

    #[error("unsupported streaming method: {0}")]
    Unsupported(String),

    #[error("credentials unavailable: {0}")]
    Credentials(String),

    #[error(transparent)]
    Aggregate(#[from] crate::aggregate::AggregateError),
}

impl ProxyError {
    /// Constituents of an aggregate failure, empty for whole-request errors
    pub fn target_errors(&self) -> &[TargetError] {
        match self {
            ProxyError::Aggregate(aggregate) => aggregate.errors(),
            _ => &[],
        }
    }

    pub fn to_status(&self) -> Status {
        match self {
            ProxyError::InvalidRequest(_) => Status::invalid_argument(self.to_string()),
            ProxyError::Unimplemented(_) | ProxyError::Unsupported(_) => {
                Status::unimplemented(self.to_string())
            }
            ProxyError::Credentials(_) => Status::unavailable(self.to_string()),
            ProxyError::Aggregate(aggregate) => aggregate.to_status(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
