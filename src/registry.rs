use serde::Serialize;
use std::path::PathBuf;

use crate::config::model::FleetConfig;
use crate::error::FleetError;

/// Deterministic identity of one tenant, derived from its ordinal.
///
/// Both `id` and `port` are pure functions of `ordinal` and the fleet
/// config; nothing about a tenant's identity is ever persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TenantIdentity {
    pub ordinal: u32,
    pub id: String,
    pub port: u16,
}

/// On-disk locations owned by one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantPaths {
    pub root: PathBuf,
    pub workspace: PathBuf,
    pub tools: PathBuf,
    pub logs: PathBuf,
    pub config_file: PathBuf,
    pub env_file: PathBuf,
    pub route_file: PathBuf,
    pub credential_file: PathBuf,
}

/// Compute a tenant id like `user-007` from a prefix, width and ordinal.
pub fn tenant_id(prefix: &str, width: usize, ordinal: u32) -> String {
    format!("{prefix}-{ordinal:0width$}")
}

/// Directory holding every tenant's private tree.
pub fn tenants_root(config: &FleetConfig) -> PathBuf {
    config.fleet.install_root.join("tenants")
}

impl TenantIdentity {
    /// Build the identity for `ordinal` without checking it against
    /// `tenant_count`. Fails if the port would leave the TCP range.
    fn derive(config: &FleetConfig, ordinal: u32) -> Result<Self, FleetError> {
        let fleet = &config.fleet;
        let port = u64::from(fleet.base_port) + u64::from(ordinal) - 1;
        let port = u16::try_from(port).map_err(|_| FleetError::PortOverflow { ordinal, port })?;
        Ok(Self {
            ordinal,
            id: tenant_id(&fleet.id_prefix, fleet.id_width, ordinal),
            port,
        })
    }

    /// Instance name handed to the process supervisor's unit template.
    pub fn unit_instance(&self) -> &str {
        &self.id
    }

    /// Public hostname the reverse proxy serves this tenant on.
    pub fn virtual_host(&self, config: &FleetConfig) -> String {
        format!("{}.{}", self.id, config.fleet.domain)
    }

    pub fn paths(&self, config: &FleetConfig) -> TenantPaths {
        let root = tenants_root(config).join(&self.id);
        TenantPaths {
            workspace: root.join("workspace"),
            tools: root.join("tools"),
            logs: root.join("logs"),
            config_file: root.join("config.json"),
            env_file: root.join("gateway.env"),
            route_file: config.proxy.routes_dir.join(format!("{}.conf", self.id)),
            credential_file: config
                .proxy
                .credentials_dir
                .join(format!("{}.htpasswd", self.id)),
            root,
        }
    }
}

/// Every tenant identity in the fleet, in ordinal order.
pub fn identities_for(config: &FleetConfig) -> Result<Vec<TenantIdentity>, FleetError> {
    (1..=config.fleet.tenant_count)
        .map(|ordinal| TenantIdentity::derive(config, ordinal))
        .collect()
}

/// The identity for a single ordinal, rejecting anything outside
/// `1..=tenant_count`.
pub fn identity_of(config: &FleetConfig, ordinal: u32) -> Result<TenantIdentity, FleetError> {
    let tenant_count = config.fleet.tenant_count;
    if ordinal < 1 || ordinal > tenant_count {
        return Err(FleetError::OutOfRange {
            ordinal,
            tenant_count,
        });
    }
    TenantIdentity::derive(config, ordinal)
}

/// Resolve an optional CLI selector: `None` means the whole fleet.
pub fn resolve_targets(
    config: &FleetConfig,
    selector: Option<u32>,
) -> Result<Vec<TenantIdentity>, FleetError> {
    match selector {
        Some(ordinal) => identity_of(config, ordinal).map(|identity| vec![identity]),
        None => identities_for(config),
    }
}
