use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parsed full method name of the form `/package.Service/Method`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodName {
    service: String,
    method: String,
}

impl MethodName {
    /// Fully qualified service, e.g. `os.OSService`
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Package part of the service name, empty when unqualified
    pub fn package(&self) -> &str {
        self.service
            .rsplit_once('.')
            .map(|(package, _)| package)
            .unwrap_or("")
    }
}

impl FromStr for MethodName {
    type Err = Error;

    fn from_str(full: &str) -> Result<Self> {
        let invalid = || Error::InvalidMethodName(full.to_string());

        let rest = full.strip_prefix('/').ok_or_else(invalid)?;
        let (service, method) = rest.split_once('/').ok_or_else(invalid)?;
        if service.is_empty() || method.is_empty() || method.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            service: service.to_string(),
            method: method.to_string(),
        })
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.service, self.method)
    }
}

/// Shape of one RPC method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl MethodDescriptor {
    pub fn unary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client_streaming: false,
            server_streaming: false,
        }
    }

    pub fn server_streaming(name: impl Into<String>) -> Self {
        Self {
            server_streaming: true,
            ..Self::unary(name)
        }
    }

    pub fn client_streaming(name: impl Into<String>) -> Self {
        Self {
            client_streaming: true,
            ..Self::unary(name)
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

/// A service and the methods it exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub package: String,
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// `package.Service`, or just `Service` without a package
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    /// `/package.Service/Method`
    pub fn full_method_name(&self, method: &MethodDescriptor) -> String {
        format!("/{}/{}", self.full_name(), method.name)
    }
}
