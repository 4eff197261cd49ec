use thiserror::Error;

/// Errors surfaced by fleet operations.
///
/// `OutOfRange`, `PortOverflow` and `MissingEnvironment` are fatal and
/// raised before any tenant is touched. The per-tenant variants are
/// collected into batch reports instead of aborting the batch.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("tenant {ordinal} is out of range (fleet has tenants 1..={tenant_count})")]
    OutOfRange { ordinal: u32, tenant_count: u32 },

    #[error("tenant {ordinal} would listen on port {port}, past the TCP port range")]
    PortOverflow { ordinal: u32, port: u64 },

    #[error("required tool `{tool}` not found on PATH ({purpose})")]
    MissingEnvironment { tool: String, purpose: String },

    #[error("provisioning {tenant} failed")]
    Provisioning {
        tenant: String,
        #[source]
        source: ProvisionError,
    },

    #[error("{verb} {tenant} failed: {reason}")]
    SupervisorCommand {
        verb: String,
        tenant: String,
        reason: String,
    },

    #[error("tenant {tenant} has no credential yet; run `tenantctl provision` first")]
    NotProvisioned { tenant: String },
}

/// A single step of tenant provisioning that failed.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{action} {path}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credential store: {0}")]
    Credential(String),

    #[error("changing owner of {path} to {user}: {reason}")]
    Ownership {
        path: String,
        user: String,
        reason: String,
    },
}

impl ProvisionError {
    pub fn io(action: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.display().to_string(),
            source,
        }
    }
}
