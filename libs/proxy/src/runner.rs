use std::collections::HashMap;
use std::sync::Arc;

use fanout_fabric::Error;
use tokio::task::JoinSet;

use crate::aggregate::{AggregateError, ErrorAggregator, ResponseItem};
use crate::client::ClientHandle;
use crate::error::TargetError;
use crate::invoker::Invoker;

/// Runs one call per client concurrently and gathers the outcomes
pub struct FanoutRunner<'a> {
    method: &'a str,
}

impl<'a> FanoutRunner<'a> {
    pub fn new(method: &'a str) -> Self {
        Self { method }
    }

    /// Call every client and wait for all of them
    ///
    /// Each client is moved into its own task, which tags a success with the
    /// client's target or wraps the failure with it, then closes the client.
    /// Results are final only once every task has been joined. A panicking
    /// task is reported as a call failure of its target.
    pub async fn run(
        &self,
        clients: Vec<ClientHandle>,
        request: Arc<[u8]>,
        invoker: Arc<dyn Invoker>,
    ) -> (Vec<ResponseItem>, Option<AggregateError>) {
        let mut tasks = JoinSet::new();
        let mut owners = HashMap::with_capacity(clients.len());

        for mut client in clients {
            let target = client.target().clone();
            let invoker = Arc::clone(&invoker);
            let request = Arc::clone(&request);

            let task = tasks.spawn(async move {
                let outcome = invoker.invoke(&mut client, &request).await;
                let target = client.target().clone();
                client.close().await;

                match outcome {
                    Ok(payload) => Ok(ResponseItem::tagged(&target, payload)),
                    Err(e) => Err(TargetError::call(target, e)),
                }
            });
            owners.insert(task.id(), target);
        }

        let mut responses = Vec::with_capacity(owners.len());
        let mut errors = ErrorAggregator::new();

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, Ok(item))) => responses.push(item),
                Ok((_, Err(e))) => {
                    tracing::warn!(method = self.method, node = %e.target, error = %e.source, "target call failed");
                    errors.push(e);
                }
                Err(join_error) => {
                    let Some(target) = owners.remove(&join_error.id()) else {
                        tracing::error!(method = self.method, error = %join_error, "untracked fan-out task failed");
                        continue;
                    };
                    tracing::error!(method = self.method, node = %target, error = %join_error, "fan-out task failed");
                    errors.push(TargetError::call(
                        target,
                        Error::Custom(format!("call task failed: {join_error}")),
                    ));
                }
            }
        }

        (responses, errors.finish())
    }
}
