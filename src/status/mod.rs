pub mod memory;
pub mod pairing;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::batch;
use crate::journal::LogSource;
use crate::registry::TenantIdentity;
use crate::supervisor::{Supervisor, UnitState};

use memory::MemoryProbe;
use pairing::extract_pairing_token;

/// Live view of one tenant, rebuilt on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveStatus {
    pub tenant_id: String,
    pub ordinal: u32,
    pub port: u16,
    /// `None` when the supervisor could not be asked.
    pub running: Option<bool>,
    pub pid: Option<u32>,
    pub resident_memory_mb: Option<u64>,
    pub autostart: Option<bool>,
    pub pairing_token: Option<String>,
}

impl LiveStatus {
    /// Row used when nothing could be learned about the tenant.
    pub fn unknown(identity: &TenantIdentity) -> Self {
        Self {
            tenant_id: identity.id.clone(),
            ordinal: identity.ordinal,
            port: identity.port,
            running: None,
            pid: None,
            resident_memory_mb: None,
            autostart: None,
            pairing_token: None,
        }
    }
}

/// Builds [`LiveStatus`] rows from the supervisor, the process table and
/// the log stream. Every sub-query is bounded by `timeout` and degrades to a
/// placeholder instead of failing the row.
#[derive(Clone)]
pub struct StatusAggregator {
    supervisor: Arc<dyn Supervisor>,
    logs: Arc<dyn LogSource>,
    memory: Arc<dyn MemoryProbe>,
    timeout: Duration,
    tail_lines: usize,
    pairing_marker: String,
}

impl StatusAggregator {
    pub fn new(
        supervisor: Arc<dyn Supervisor>,
        logs: Arc<dyn LogSource>,
        memory: Arc<dyn MemoryProbe>,
        timeout: Duration,
        tail_lines: usize,
        pairing_marker: &str,
    ) -> Self {
        Self {
            supervisor,
            logs,
            memory,
            timeout,
            tail_lines,
            pairing_marker: pairing_marker.to_string(),
        }
    }

    pub async fn status_of(&self, identity: &TenantIdentity) -> LiveStatus {
        let unit = identity.unit_instance();
        let mut status = LiveStatus::unknown(identity);

        if let Some(UnitState {
            active,
            pid,
            enabled,
        }) = self
            .degraded("unit state", &identity.id, self.supervisor.query(unit))
            .await
        {
            status.running = Some(active);
            status.pid = pid;
            status.autostart = Some(enabled);
        }

        if let (Some(true), Some(pid)) = (status.running, status.pid) {
            status.resident_memory_mb = self
                .degraded("memory", &identity.id, self.memory.resident_mb(pid))
                .await;
        }

        if let Some(lines) = self
            .degraded("log tail", &identity.id, self.logs.tail(unit, self.tail_lines))
            .await
        {
            status.pairing_token = extract_pairing_token(&lines, &self.pairing_marker);
        }

        status
    }

    /// One row per identity, in ordinal order, queried on a bounded pool.
    pub async fn status_all(
        &self,
        identities: Vec<TenantIdentity>,
        parallelism: usize,
    ) -> Vec<LiveStatus> {
        let aggregator = self.clone();
        let report = batch::run(identities, parallelism, move |identity| {
            let aggregator = aggregator.clone();
            async move { Ok(aggregator.status_of(&identity).await) }
        })
        .await;

        report
            .entries
            .into_iter()
            .map(|entry| match entry.outcome {
                Ok(status) => status,
                Err(_) => LiveStatus::unknown(&entry.identity),
            })
            .collect()
    }

    /// Await a sub-query under the timeout; failures become `None`.
    async fn degraded<T, E, F>(&self, field: &str, tenant: &str, query: F) -> Option<T>
    where
        E: std::fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                debug!(tenant, field, error = %e, "status query degraded");
                None
            }
            Err(_) => {
                debug!(tenant, field, timeout = ?self.timeout, "status query timed out");
                None
            }
        }
    }
}
