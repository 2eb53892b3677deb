use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{DialOptions, DEFAULT_BACKEND_PORT};

/// Proxy settings
///
/// Every field has a default, so partial configuration files are fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Port every backend node serves on
    pub backend_port: u16,

    /// Only methods of this `package` or `package.Service` are fanned out
    pub scope: Option<String>,

    /// Upper bound for establishing one backend connection
    pub connect_timeout_ms: Option<u64>,

    /// Node-local service that receives calls not fanned out
    pub local_socket: Option<PathBuf>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            backend_port: DEFAULT_BACKEND_PORT,
            scope: None,
            connect_timeout_ms: None,
            local_socket: None,
        }
    }
}

impl ProxyConfig {
    pub fn dial_options(&self) -> DialOptions {
        DialOptions {
            port: self.backend_port,
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
        }
    }
}
