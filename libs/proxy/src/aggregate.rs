use std::fmt;

use fanout_core::{NodeMetadata, Status, Target};
use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, TargetError};

/// One target's successful reply, tagged with that target's identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseItem {
    pub metadata: NodeMetadata,
    pub payload: Vec<u8>,
}

impl ResponseItem {
    pub fn tagged(target: &Target, payload: Vec<u8>) -> Self {
        Self {
            metadata: NodeMetadata::from(target),
            payload,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.metadata.hostname
    }
}

/// Merged reply of a fan-out call
///
/// Item order carries no meaning; use each item's metadata for attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanoutResponse {
    pub response: Vec<ResponseItem>,
}

impl FanoutResponse {
    pub fn len(&self) -> usize {
        self.response.len()
    }

    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResponseItem> {
        self.response.iter()
    }

    /// Item produced by `hostname`, if it succeeded
    pub fn get(&self, hostname: &str) -> Option<&ResponseItem> {
        self.response.iter().find(|item| item.hostname() == hostname)
    }
}

/// Structural merge of per-target items
pub struct ResponseAggregator;

impl ResponseAggregator {
    pub fn merge(items: impl IntoIterator<Item = ResponseItem>) -> FanoutResponse {
        FanoutResponse {
            response: items.into_iter().collect(),
        }
    }
}

/// Combined per-target failure
///
/// Never empty: [`ErrorAggregator::finish`] yields `None` when nothing failed.
#[derive(Debug)]
pub struct AggregateError {
    errors: Vec<TargetError>,
}

impl AggregateError {
    pub fn errors(&self) -> &[TargetError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, target: &Target) -> Option<&TargetError> {
        self.errors.iter().find(|e| &e.target == target)
    }

    pub fn count(&self, kind: FailureKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    /// `Unavailable` status with one detail per constituent
    pub fn to_status(&self) -> Status {
        Status::unavailable(format!("{} of the targets failed", self.errors.len()))
            .with_details(self.errors.iter().map(TargetError::to_status).collect())
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "{} {} occurred:", self.errors.len(), noun)?;
        for error in &self.errors {
            write!(f, "\n\t* {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Accumulates per-target failures
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: Vec<TargetError>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: TargetError) {
        self.errors.push(error);
    }

    /// Absorb the constituents of an earlier aggregate
    pub fn extend(&mut self, aggregate: Option<AggregateError>) {
        if let Some(aggregate) = aggregate {
            self.errors.extend(aggregate.errors);
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Option<AggregateError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(AggregateError {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_core::Code;

    #[test]
    fn no_constituents_means_no_error() {
        let mut errors = ErrorAggregator::new();
        errors.extend(None);
        assert!(errors.finish().is_none());
    }

    #[test]
    fn constituents_stay_inspectable() {
        let mut dials = ErrorAggregator::new();
        dials.push(TargetError::dial(
            Target::new("b"),
            fanout_fabric::Error::ConnectionClosed,
        ));

        let mut errors = ErrorAggregator::new();
        errors.extend(dials.finish());
        errors.push(TargetError::call(
            Target::new("c"),
            fanout_fabric::Error::Status(Status::internal("boom")),
        ));
        let aggregate = errors.finish().unwrap();

        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.count(FailureKind::Dial), 1);
        assert_eq!(aggregate.get(&Target::new("c")).unwrap().kind, FailureKind::Call);
        assert!(aggregate.to_string().starts_with("2 errors occurred:"));

        let status = aggregate.to_status();
        assert_eq!(status.code, Code::Unavailable);
        assert_eq!(status.details.len(), 2);
        assert_eq!(status.details[0].code, Code::Unavailable);
        assert_eq!(status.details[1].code, Code::Internal);
        assert_eq!(status.details[1].target.as_deref(), Some("c"));
    }

    #[test]
    fn merge_tags_each_item() {
        let response = ResponseAggregator::merge([
            ResponseItem::tagged(&Target::new("a"), b"1".to_vec()),
            ResponseItem::tagged(&Target::new("b"), b"2".to_vec()),
        ]);

        assert_eq!(response.len(), 2);
        assert_eq!(response.get("b").unwrap().payload, b"2");
        assert!(response.get("c").is_none());
    }
}
