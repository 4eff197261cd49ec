//! Test doubles for the external collaborators, plus a config builder.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::model::{FleetConfig, FleetSection, GatewayConfig, ProxyConfig, SupervisorConfig};
use crate::credentials::CredentialStore;
use crate::journal::LogSource;
use crate::status::memory::MemoryProbe;
use crate::supervisor::{Supervisor, SupervisorError, UnitState, Verb};

/// Name of the account running the tests, so provisioning as root can chown
/// to a user that exists.
#[cfg(unix)]
fn current_user() -> String {
    nix::unistd::User::from_uid(nix::unistd::Uid::effective())
        .ok()
        .flatten()
        .map(|u| u.name)
        .unwrap_or_else(|| "root".to_string())
}

#[cfg(not(unix))]
fn current_user() -> String {
    "gateway".to_string()
}

/// A fleet rooted at `root` with every host path redirected inside it and
/// proxy reloads disabled.
pub fn fleet_config(root: &Path, tenant_count: u32, base_port: u16) -> FleetConfig {
    FleetConfig {
        fleet: FleetSection {
            tenant_count,
            base_port,
            domain: "gw.example.com".to_string(),
            cert_issuer_email: "ops@example.com".to_string(),
            install_root: root.to_path_buf(),
            service_user: current_user(),
            id_prefix: "user".to_string(),
            id_width: 3,
            parallelism: 4,
            query_timeout: Duration::from_secs(2),
        },
        gateway: GatewayConfig::default(),
        proxy: ProxyConfig {
            routes_dir: root.join("nginx").join("conf.d"),
            credentials_dir: root.join("nginx").join("htpasswd"),
            reload_command: Vec::new(),
        },
        supervisor: SupervisorConfig {
            unit_dir: root.join("systemd"),
            ..SupervisorConfig::default()
        },
    }
}

// ---------------------------------------------------------------------------
// FakeSupervisor
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SupervisorState {
    calls: Vec<(Verb, String)>,
    failing: HashSet<String>,
    states: HashMap<String, UnitState>,
    latency: HashMap<String, Duration>,
    reloads: usize,
}

#[derive(Default)]
pub struct FakeSupervisor {
    state: Mutex<SupervisorState>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, unit: &str) {
        self.state.lock().unwrap().failing.insert(unit.to_string());
    }

    pub fn set_state(&self, unit: &str, state: UnitState) {
        self.state
            .lock()
            .unwrap()
            .states
            .insert(unit.to_string(), state);
    }

    pub fn set_latency(&self, unit: &str, latency: Duration) {
        self.state
            .lock()
            .unwrap()
            .latency
            .insert(unit.to_string(), latency);
    }

    pub fn calls(&self) -> Vec<(Verb, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn reloads(&self) -> usize {
        self.state.lock().unwrap().reloads
    }

    fn latency_of(&self, unit: &str) -> Option<Duration> {
        self.state.lock().unwrap().latency.get(unit).copied()
    }

    fn is_failing(&self, unit: &str) -> bool {
        self.state.lock().unwrap().failing.contains(unit)
    }
}

#[async_trait]
impl Supervisor for FakeSupervisor {
    async fn apply(&self, verb: Verb, unit_instance: &str) -> Result<(), SupervisorError> {
        if let Some(latency) = self.latency_of(unit_instance) {
            tokio::time::sleep(latency).await;
        }
        self.state
            .lock()
            .unwrap()
            .calls
            .push((verb, unit_instance.to_string()));
        if self.is_failing(unit_instance) {
            return Err(SupervisorError::Command {
                command: format!("systemctl {verb} {unit_instance}"),
                status: "exit status: 1".to_string(),
                stderr: "Job failed".to_string(),
            });
        }
        Ok(())
    }

    async fn query(&self, unit_instance: &str) -> Result<UnitState, SupervisorError> {
        if let Some(latency) = self.latency_of(unit_instance) {
            tokio::time::sleep(latency).await;
        }
        if self.is_failing(unit_instance) {
            return Err(SupervisorError::Parse("fake failure".to_string()));
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .states
            .get(unit_instance)
            .cloned()
            .unwrap_or_default())
    }

    async fn reload_units(&self) -> Result<(), SupervisorError> {
        self.state.lock().unwrap().reloads += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeLogSource
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeLogSource {
    lines: Mutex<HashMap<String, Vec<String>>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, unit: &str, line: &str) {
        self.lines
            .lock()
            .unwrap()
            .entry(unit.to_string())
            .or_default()
            .push(line.to_string());
    }

    pub fn fail_on(&self, unit: &str) {
        self.failing.lock().unwrap().insert(unit.to_string());
    }

    fn window(&self, unit: &str, lines: usize) -> Vec<String> {
        let all = self
            .lines
            .lock()
            .unwrap()
            .get(unit)
            .cloned()
            .unwrap_or_default();
        let skip = all.len().saturating_sub(lines);
        all.into_iter().skip(skip).collect()
    }
}

#[async_trait]
impl LogSource for FakeLogSource {
    async fn tail(&self, unit_instance: &str, lines: usize) -> Result<Vec<String>> {
        if self.failing.lock().unwrap().contains(unit_instance) {
            bail!("journal unavailable");
        }
        Ok(self.window(unit_instance, lines))
    }

    async fn follow(
        &self,
        unit_instance: &str,
        lines: usize,
        tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<()> {
        for line in self.window(unit_instance, lines) {
            if tx.send(line).await.is_err() {
                return Ok(());
            }
        }
        cancel.cancelled().await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeCredentialStore
// ---------------------------------------------------------------------------

/// Stores `user:sha256(secret)` lines instead of calling `htpasswd`.
#[derive(Default)]
pub struct FakeCredentialStore {
    failing: Mutex<HashSet<String>>,
    writes: Mutex<Vec<String>>,
}

impl FakeCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, user: &str) {
        self.failing.lock().unwrap().insert(user.to_string());
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn hash(secret: &str) -> String {
        hex::encode(Sha256::digest(secret.as_bytes()))
    }
}

#[async_trait]
impl CredentialStore for FakeCredentialStore {
    async fn write_entry(&self, file: &Path, user: &str, secret: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(user) {
            bail!("hashing utility failed for {user}");
        }
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(file, format!("{}:{}\n", user, Self::hash(secret))).await?;
        self.writes.lock().unwrap().push(user.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeMemoryProbe
// ---------------------------------------------------------------------------

pub struct FakeMemoryProbe {
    mb: u64,
}

impl FakeMemoryProbe {
    pub fn new(mb: u64) -> Self {
        Self { mb }
    }
}

#[async_trait]
impl MemoryProbe for FakeMemoryProbe {
    async fn resident_mb(&self, _pid: u32) -> Result<u64> {
        Ok(self.mb)
    }
}
