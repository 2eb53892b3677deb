use std::fmt;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Address of one backend node, usually a bare host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Target(String);

impl Target {
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    pub fn host(&self) -> &str {
        &self.0
    }

    /// Host and port to dial, honoring an explicit `host:port` or `[v6]:port`
    pub fn host_port(&self, default_port: u16) -> (String, u16) {
        if let Ok(addr) = self.0.parse::<SocketAddr>() {
            return (addr.ip().to_string(), addr.port());
        }

        if let Some((host, port)) = self.0.rsplit_once(':') {
            if !host.contains(':') {
                if let Ok(port) = port.parse::<u16>() {
                    return (host.to_string(), port);
                }
            }
        }

        let host = self
            .0
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.0);
        (host.to_string(), default_port)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(host: &str) -> Self {
        Self::new(host)
    }
}

impl From<String> for Target {
    fn from(host: String) -> Self {
        Self(host)
    }
}

/// Identity of the node that produced a response item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub hostname: String,
}

impl From<&Target> for NodeMetadata {
    fn from(target: &Target) -> Self {
        Self {
            hostname: target.host().to_string(),
        }
    }
}
