use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

use crate::registry::TenantIdentity;

/// One tenant's result inside a batch.
#[derive(Debug)]
pub struct BatchEntry<T> {
    pub identity: TenantIdentity,
    pub outcome: anyhow::Result<T>,
}

/// Per-tenant outcomes of a batch run, always in ordinal order.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub entries: Vec<BatchEntry<T>>,
}

impl<T> BatchReport<T> {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of the tenants whose operation failed.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_err())
            .map(|e| e.identity.id.as_str())
            .collect()
    }
}

/// Run `op` once per target on a bounded worker pool.
///
/// Every target gets its own task and its own outcome; a failing or
/// panicking tenant never prevents the others from running. Outcomes are
/// buffered and returned sorted by ordinal, whatever order they finished in.
pub async fn run<T, F, Fut>(
    targets: Vec<TenantIdentity>,
    parallelism: usize,
    op: F,
) -> BatchReport<T>
where
    T: Send + 'static,
    F: Fn(TenantIdentity) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let op = Arc::new(op);
    let permits = Arc::new(Semaphore::new(parallelism.max(1)));
    let mut set = JoinSet::new();
    let mut pending = HashMap::with_capacity(targets.len());

    for identity in targets {
        let op = Arc::clone(&op);
        let permits = Arc::clone(&permits);
        let tenant = identity.clone();
        let handle = set.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| anyhow!("worker pool closed"))?;
            op(tenant).await
        });
        pending.insert(handle.id(), identity);
    }

    let mut entries = Vec::with_capacity(pending.len());
    while let Some(joined) = set.join_next_with_id().await {
        let (task_id, outcome) = match joined {
            Ok((task_id, outcome)) => (task_id, outcome),
            Err(join_err) => {
                let task_id = join_err.id();
                (task_id, Err(anyhow!("task failed: {join_err}")))
            }
        };
        match pending.remove(&task_id) {
            Some(identity) => {
                if let Err(e) = &outcome {
                    error!(tenant = %identity.id, error = %format!("{e:#}"), "tenant operation failed");
                }
                entries.push(BatchEntry { identity, outcome });
            }
            None => error!(?task_id, "batch result for unknown task"),
        }
    }

    entries.sort_by_key(|e| e.identity.ordinal);
    BatchReport { entries }
}
