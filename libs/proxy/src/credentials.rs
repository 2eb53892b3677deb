use std::sync::Arc;

use fanout_fabric::TransportCredentials;

/// Source of client credentials for fan-out sub-calls
///
/// Consulted once per invocation so rotated certificates take effect on the
/// next call.
#[async_trait::async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn credentials(&self) -> fanout_fabric::Result<Arc<dyn TransportCredentials>>;
}

/// Always hands out the same credentials
#[derive(Clone)]
pub struct StaticCredentials {
    credentials: Arc<dyn TransportCredentials>,
}

impl StaticCredentials {
    pub fn new(credentials: impl TransportCredentials + 'static) -> Self {
        Self {
            credentials: Arc::new(credentials),
        }
    }

    pub fn insecure() -> Self {
        Self::new(fanout_fabric::Insecure)
    }
}

#[async_trait::async_trait]
impl CredentialsProvider for StaticCredentials {
    async fn credentials(&self) -> fanout_fabric::Result<Arc<dyn TransportCredentials>> {
        Ok(Arc::clone(&self.credentials))
    }
}
