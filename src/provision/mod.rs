pub mod render;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::model::FleetConfig;
use crate::credentials::{self, CredentialStore};
use crate::error::ProvisionError;
use crate::registry::TenantIdentity;

use render::{render_env_file, render_gateway_config, RouteEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The tenant's credential was created by this run.
    Created,
    /// The credential already existed; derived artifacts were refreshed.
    AlreadyProvisioned,
}

impl std::fmt::Display for ProvisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProvisionOutcome::Created => f.write_str("created"),
            ProvisionOutcome::AlreadyProvisioned => f.write_str("already provisioned (refreshed)"),
        }
    }
}

/// Materializes a tenant's durable and derived artifacts.
///
/// Durable state (directories, credential) is only ever created; derived
/// artifacts (config, env file, route) are rewritten on every run.
#[derive(Clone)]
pub struct Provisioner {
    config: Arc<FleetConfig>,
    store: Arc<dyn CredentialStore>,
}

impl Provisioner {
    pub fn new(config: Arc<FleetConfig>, store: Arc<dyn CredentialStore>) -> Self {
        Self { config, store }
    }

    pub async fn provision(
        &self,
        identity: &TenantIdentity,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let config = &self.config;
        let paths = identity.paths(config);

        for dir in [&paths.workspace, &paths.tools, &paths.logs] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ProvisionError::io("creating", dir, e))?;
        }
        set_owner(&paths.root, &config.fleet.service_user)?;
        for dir in [&paths.workspace, &paths.tools, &paths.logs] {
            set_owner(dir, &config.fleet.service_user)?;
        }

        let created = self.ensure_credential(identity, &paths.credential_file).await?;

        write_file(&paths.config_file, &render_gateway_config(config, identity)).await?;
        write_file(&paths.env_file, &render_env_file(config, identity)).await?;

        let route = RouteEntry::for_tenant(config, identity);
        write_file(&paths.route_file, &route.render()).await?;
        debug!(tenant = %identity.id, host = %route.virtual_host, port = route.upstream_port, "route written");

        let outcome = if created {
            ProvisionOutcome::Created
        } else {
            ProvisionOutcome::AlreadyProvisioned
        };
        info!(tenant = %identity.id, %outcome, "tenant provisioned");
        Ok(outcome)
    }

    /// Create the tenant's credential unless the store already has one.
    /// Returns whether a new credential was generated.
    async fn ensure_credential(
        &self,
        identity: &TenantIdentity,
        credential_file: &Path,
    ) -> Result<bool, ProvisionError> {
        let cred_err = |e: anyhow::Error| ProvisionError::Credential(format!("{e:#}"));

        let _lock = credentials::lock_tenant(&self.config.proxy.credentials_dir, &identity.id)
            .await
            .map_err(cred_err)?;

        if self
            .store
            .has_entry(credential_file, &identity.id)
            .await
            .map_err(cred_err)?
        {
            debug!(tenant = %identity.id, "credential exists, leaving it untouched");
            return Ok(false);
        }

        let secret = credentials::generate_secret();
        // Ledger first: if hashing fails, a rerun generates and records a
        // fresh secret instead of leaving an unrecorded one in the store.
        let ledger = credentials::ledger_path(&self.config.fleet.install_root);
        credentials::append_ledger(&ledger, &identity.id, &secret)
            .await
            .map_err(cred_err)?;
        self.store
            .write_entry(credential_file, &identity.id, &secret)
            .await
            .map_err(cred_err)?;
        info!(tenant = %identity.id, ledger = %ledger.display(), "credential created");
        Ok(true)
    }
}

/// Write a derived artifact, creating its parent directory if needed.
pub async fn write_file(path: &Path, content: &str) -> Result<(), ProvisionError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ProvisionError::io("creating", parent, e))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| ProvisionError::io("writing", path, e))
}

/// Hand a tenant directory to the service user. Only meaningful (and only
/// attempted) when running as root.
#[cfg(unix)]
fn set_owner(path: &Path, user: &str) -> Result<(), ProvisionError> {
    use nix::unistd::{chown, Uid, User};

    if !Uid::effective().is_root() {
        return Ok(());
    }
    let ownership = |reason: String| ProvisionError::Ownership {
        path: path.display().to_string(),
        user: user.to_string(),
        reason,
    };
    let account = User::from_name(user)
        .map_err(|e| ownership(e.to_string()))?
        .ok_or_else(|| ownership("no such user".to_string()))?;
    chown(path, Some(account.uid), Some(account.gid)).map_err(|e| ownership(e.to_string()))
}

#[cfg(not(unix))]
fn set_owner(_path: &Path, _user: &str) -> Result<(), ProvisionError> {
    Ok(())
}
