pub mod systemd;
pub mod unit;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Verb: lifecycle commands the operator can issue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Restart => "restart",
            Verb::Enable => "enable",
            Verb::Disable => "disable",
        }
    }

    /// Past tense used in per-tenant report lines.
    pub fn done(&self) -> &'static str {
        match self {
            Verb::Start => "started",
            Verb::Stop => "stopped",
            Verb::Restart => "restarted",
            Verb::Enable => "enabled",
            Verb::Disable => "disabled",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UnitState: what the supervisor knows about one tenant unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitState {
    pub active: bool,
    pub pid: Option<u32>,
    pub enabled: bool,
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected supervisor output: {0}")]
    Parse(String),
}

/// Capability interface over the external per-unit process supervisor.
///
/// Implementations address units by the tenant's unit instance name; the
/// unit template itself lives in [`unit`] and is never part of this trait.
#[async_trait]
pub trait Supervisor: Send + Sync {
    async fn apply(&self, verb: Verb, unit_instance: &str) -> Result<(), SupervisorError>;

    async fn query(&self, unit_instance: &str) -> Result<UnitState, SupervisorError>;

    /// Re-read unit definitions after the template changed on disk.
    async fn reload_units(&self) -> Result<(), SupervisorError>;
}
