use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fanout_core::{MethodName, ServiceDescriptor};

use crate::error::{ProxyError, Result};
use crate::invoker::{Invoker, UnaryInvoker};

/// Immutable method name to invoker mapping
///
/// Built once at startup and shared read-only.
pub struct MethodRegistry {
    invokers: HashMap<String, Arc<dyn Invoker>>,
    streaming: HashSet<String>,
}

impl MethodRegistry {
    pub fn builder() -> MethodRegistryBuilder {
        MethodRegistryBuilder::default()
    }

    /// Invoker for a full method name
    ///
    /// Unknown methods are `Unimplemented`; streaming methods are known but
    /// never dispatched and fail as `Unsupported`.
    pub fn lookup(&self, method: &str) -> Result<Arc<dyn Invoker>> {
        if let Some(invoker) = self.invokers.get(method) {
            return Ok(Arc::clone(invoker));
        }

        if self.streaming.contains(method) {
            Err(ProxyError::Unsupported(method.to_string()))
        } else {
            Err(ProxyError::Unimplemented(method.to_string()))
        }
    }

    pub fn contains(&self, method: &str) -> bool {
        self.invokers.contains_key(method)
    }

    pub fn len(&self) -> usize {
        self.invokers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invokers.is_empty()
    }
}

#[derive(Default)]
pub struct MethodRegistryBuilder {
    invokers: HashMap<String, Arc<dyn Invoker>>,
    streaming: HashSet<String>,
}

impl MethodRegistryBuilder {
    /// Register every method of a service
    ///
    /// Unary methods forward through a [`UnaryInvoker`]; streaming methods
    /// are only recorded so they can be rejected.
    pub fn service(mut self, service: &ServiceDescriptor) -> Self {
        for method in &service.methods {
            let full_name = service.full_method_name(method);
            if method.is_streaming() {
                self.invokers.remove(&full_name);
                self.streaming.insert(full_name);
            } else {
                self.streaming.remove(&full_name);
                let invoker = Arc::new(UnaryInvoker::new(full_name.clone()));
                self.invokers.insert(full_name, invoker);
            }
        }
        self
    }

    /// Register a custom invoker for one method
    pub fn invoker(
        mut self,
        method: &str,
        invoker: Arc<dyn Invoker>,
    ) -> fanout_core::Result<Self> {
        let name: MethodName = method.parse()?;
        let full_name = name.to_string();
        self.streaming.remove(&full_name);
        self.invokers.insert(full_name, invoker);
        Ok(self)
    }

    pub fn build(self) -> MethodRegistry {
        MethodRegistry {
            invokers: self.invokers,
            streaming: self.streaming,
        }
    }
}
