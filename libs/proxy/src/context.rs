use std::time::Duration;

use fanout_core::Metadata;
use tokio::time::Instant;

/// Outgoing context shared by every sub-call of one invocation
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub metadata: Metadata,
    pub deadline: Option<Instant>,
}

impl CallContext {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| deadline <= Instant::now())
    }
}
