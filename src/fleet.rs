use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::batch::{self, BatchReport};
use crate::config::model::FleetConfig;
use crate::credentials::{self, CredentialStore, HtpasswdStore};
use crate::error::FleetError;
use crate::journal::{JournalLogSource, LogSource};
use crate::provision::{self, ProvisionOutcome, Provisioner};
use crate::proxy;
use crate::registry::{self, TenantIdentity};
use crate::status::memory::{MemoryProbe, ProcMemoryProbe};
use crate::status::{LiveStatus, StatusAggregator};
use crate::supervisor::systemd::SystemdSupervisor;
use crate::supervisor::{unit, Supervisor, Verb};

/// The external collaborators a fleet talks to.
#[derive(Clone)]
pub struct Backends {
    pub supervisor: Arc<dyn Supervisor>,
    pub logs: Arc<dyn LogSource>,
    pub store: Arc<dyn CredentialStore>,
    pub memory: Arc<dyn MemoryProbe>,
}

impl Backends {
    /// systemd, journald, htpasswd and `/proc` on the local host.
    pub fn system(config: &FleetConfig) -> Self {
        let unit_name = &config.supervisor.unit_name;
        Self {
            supervisor: Arc::new(SystemdSupervisor::new(unit_name)),
            logs: Arc::new(JournalLogSource::new(unit_name)),
            store: Arc::new(HtpasswdStore),
            memory: Arc::new(ProcMemoryProbe),
        }
    }
}

/// Outcome of a fleet-wide provisioning run.
#[derive(Debug)]
pub struct ProvisionReport {
    pub tenants: BatchReport<ProvisionOutcome>,
    pub unit_template: Result<()>,
    pub units_reloaded: Result<()>,
    /// `Ok(false)` when no reload command is configured.
    pub proxy_reloaded: Result<bool>,
}

impl ProvisionReport {
    pub fn is_success(&self) -> bool {
        self.tenants.is_success()
            && self.unit_template.is_ok()
            && self.units_reloaded.is_ok()
            && self.proxy_reloaded.is_ok()
    }
}

/// Control-plane entry point over one fleet config.
///
/// Holds no tenant state of its own: identities are recomputed from the
/// config for every operation and live state is always queried fresh.
pub struct Fleet {
    config: Arc<FleetConfig>,
    backends: Backends,
}

impl Fleet {
    pub fn new(config: FleetConfig, backends: Backends) -> Self {
        Self {
            config: Arc::new(config),
            backends,
        }
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    pub fn targets(&self, selector: Option<u32>) -> Result<Vec<TenantIdentity>, FleetError> {
        registry::resolve_targets(&self.config, selector)
    }

    fn parallelism(&self) -> usize {
        self.config.fleet.parallelism
    }

    /// Issue `verb` to every target; failures are collected, not raised.
    pub async fn apply(&self, verb: Verb, targets: Vec<TenantIdentity>) -> BatchReport<()> {
        let supervisor = Arc::clone(&self.backends.supervisor);
        batch::run(targets, self.parallelism(), move |identity| {
            let supervisor = Arc::clone(&supervisor);
            async move {
                supervisor
                    .apply(verb, identity.unit_instance())
                    .await
                    .map_err(|e| FleetError::SupervisorCommand {
                        verb: verb.to_string(),
                        tenant: identity.id.clone(),
                        reason: e.to_string(),
                    })?;
                info!(tenant = %identity.id, %verb, "supervisor verb applied");
                Ok(())
            }
        })
        .await
    }

    pub fn aggregator(&self) -> StatusAggregator {
        StatusAggregator::new(
            Arc::clone(&self.backends.supervisor),
            Arc::clone(&self.backends.logs),
            Arc::clone(&self.backends.memory),
            self.config.fleet.query_timeout,
            self.config.supervisor.log_tail_lines,
            &self.config.gateway.pairing_marker,
        )
    }

    pub async fn status(&self, targets: Vec<TenantIdentity>) -> Vec<LiveStatus> {
        self.aggregator().status_all(targets, self.parallelism()).await
    }

    /// Provision `targets`, then refresh the shared unit template and ask
    /// the supervisor and the reverse proxy to pick up the changes.
    pub async fn provision(&self, targets: Vec<TenantIdentity>) -> ProvisionReport {
        let template_path = unit::template_path(&self.config);
        let unit_template = provision::write_file(
            &template_path,
            &unit::render_unit_template(&self.config),
        )
        .await
        .with_context(|| format!("writing unit template {}", template_path.display()));

        let provisioner = Provisioner::new(Arc::clone(&self.config), Arc::clone(&self.backends.store));
        let tenants = batch::run(targets, self.parallelism(), move |identity| {
            let provisioner = provisioner.clone();
            async move {
                provisioner
                    .provision(&identity)
                    .await
                    .map_err(|source| FleetError::Provisioning {
                        tenant: identity.id.clone(),
                        source,
                    })
                    .map_err(anyhow::Error::from)
            }
        })
        .await;

        let units_reloaded = self
            .backends
            .supervisor
            .reload_units()
            .await
            .context("reloading supervisor units");

        let proxy_reloaded = proxy::reload(&self.config.proxy.reload_command).await;

        ProvisionReport {
            tenants,
            unit_template,
            units_reloaded,
            proxy_reloaded,
        }
    }

    /// Replace one tenant's hashed credential. Config, env and route files
    /// are left alone.
    pub async fn rotate_password(&self, identity: &TenantIdentity, secret: &str) -> Result<()> {
        let paths = identity.paths(&self.config);
        let _lock = credentials::lock_tenant(&self.config.proxy.credentials_dir, &identity.id).await?;

        if !self
            .backends
            .store
            .has_entry(&paths.credential_file, &identity.id)
            .await?
        {
            return Err(FleetError::NotProvisioned {
                tenant: identity.id.clone(),
            }
            .into());
        }

        self.backends
            .store
            .write_entry(&paths.credential_file, &identity.id, secret)
            .await
            .with_context(|| format!("updating credential for {}", identity.id))?;
        info!(tenant = %identity.id, "credential rotated");
        Ok(())
    }

    /// Stream one tenant's log into `tx` until `cancel` fires.
    pub async fn follow_logs(
        &self,
        identity: &TenantIdentity,
        lines: usize,
        tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.backends
            .logs
            .follow(identity.unit_instance(), lines, tx, cancel)
            .await
    }

    pub async fn tail_logs(&self, identity: &TenantIdentity, lines: usize) -> Result<Vec<String>> {
        self.backends.logs.tail(identity.unit_instance(), lines).await
    }
}
