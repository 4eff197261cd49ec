use anyhow::{Context, Result};
use async_trait::async_trait;

/// Reads resident memory for a running process.
#[async_trait]
pub trait MemoryProbe: Send + Sync {
    /// Resident set size of `pid`, in whole megabytes.
    async fn resident_mb(&self, pid: u32) -> Result<u64>;
}

/// [`MemoryProbe`] backed by `/proc/<pid>/status`.
pub struct ProcMemoryProbe;

#[async_trait]
impl MemoryProbe for ProcMemoryProbe {
    async fn resident_mb(&self, pid: u32) -> Result<u64> {
        let path = format!("/proc/{pid}/status");
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {path}"))?;
        parse_vm_rss_kb(&content)
            .map(|kb| kb / 1024)
            .with_context(|| format!("no VmRSS line in {path}"))
    }
}

/// Extract the `VmRSS:` value (in kB) from a `/proc/<pid>/status` dump.
pub fn parse_vm_rss_kb(status: &str) -> Option<u64> {
    status.lines().find_map(|line| {
        let rest = line.strip_prefix("VmRSS:")?;
        rest.split_whitespace().next()?.parse().ok()
    })
}
