use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use fanout_core::{MethodDescriptor, ServiceDescriptor};
use fanout_proxy::{MethodRegistry, ProxyConfig};
use serde::Deserialize;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:50000";

/// Daemon configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Address the node serves on
    pub listen: Option<SocketAddr>,
    pub proxy: ProxyConfig,
    pub services: Vec<ServiceConfig>,
}

/// One service whose methods may be fanned out
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub package: String,
    pub name: String,
    #[serde(default)]
    pub unary: Vec<String>,
    #[serde(default)]
    pub server_streaming: Vec<String>,
    #[serde(default)]
    pub client_streaming: Vec<String>,
}

impl ServiceConfig {
    pub fn descriptor(&self) -> ServiceDescriptor {
        let unary = self.unary.iter().map(MethodDescriptor::unary);
        let server = self
            .server_streaming
            .iter()
            .map(MethodDescriptor::server_streaming);
        let client = self
            .client_streaming
            .iter()
            .map(MethodDescriptor::client_streaming);

        unary
            .chain(server)
            .chain(client)
            .fold(ServiceDescriptor::new(&self.package, &self.name), |service, method| {
                service.method(method)
            })
    }
}

impl DaemonConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        match self.listen {
            Some(addr) => Ok(addr),
            None => Ok(DEFAULT_LISTEN.parse()?),
        }
    }

    pub fn registry(&self) -> MethodRegistry {
        self.services
            .iter()
            .fold(MethodRegistry::builder(), |builder, service| {
                builder.service(&service.descriptor())
            })
            .build()
    }
}
