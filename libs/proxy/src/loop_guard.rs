//! Proxy-loop protection
//!
//! Sub-calls carry `proxyfrom` naming the node the client originally
//! reached. A node receiving such a call serves it locally instead of fanning
//! out again, which bounds any cycle to a single hop.

use fanout_core::metadata::{AUTHORITY, PROXY_FROM};
use fanout_core::Metadata;

/// Whether the call was already fanned out by another node
pub fn is_proxied(incoming: &Metadata) -> bool {
    incoming.contains_key(PROXY_FROM)
}

/// Metadata for sub-calls of an invocation
///
/// Holds only the marker. An existing marker is carried over unchanged so
/// the original authority survives further hops.
pub fn outgoing_metadata(incoming: &Metadata) -> Metadata {
    let origin = if is_proxied(incoming) {
        incoming.get_all(PROXY_FROM)
    } else {
        incoming.get_all(AUTHORITY)
    };

    Metadata::new().with(PROXY_FROM, origin.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_original_authority() {
        let incoming = Metadata::new().with(AUTHORITY, ["10.0.0.1"]);
        let outgoing = outgoing_metadata(&incoming);

        assert!(!is_proxied(&incoming));
        assert!(is_proxied(&outgoing));
        assert_eq!(outgoing.get_all(PROXY_FROM), ["10.0.0.1"]);
        assert!(!outgoing.contains_key(AUTHORITY));
    }

    #[test]
    fn keeps_existing_marker() {
        let incoming = Metadata::new()
            .with(AUTHORITY, ["10.0.0.2"])
            .with(PROXY_FROM, ["10.0.0.1"]);

        assert_eq!(outgoing_metadata(&incoming).get_all(PROXY_FROM), ["10.0.0.1"]);
    }

    #[test]
    fn marker_present_even_without_authority() {
        let outgoing = outgoing_metadata(&Metadata::new());
        assert!(is_proxied(&outgoing));
        assert!(outgoing.get(PROXY_FROM).is_none());
    }
}
