use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::unit::instance_unit;
use super::{Supervisor, SupervisorError, UnitState, Verb};

/// [`Supervisor`] backed by systemd template units (`{unit}@{tenant}.service`).
pub struct SystemdSupervisor {
    unit_name: String,
}

impl SystemdSupervisor {
    pub fn new(unit_name: &str) -> Self {
        Self {
            unit_name: unit_name.to_string(),
        }
    }

    fn unit(&self, unit_instance: &str) -> String {
        instance_unit(&self.unit_name, unit_instance)
    }

    /// Execute a systemctl command, returning stdout on success or the
    /// trimmed stderr on failure.
    async fn run_systemctl(&self, args: &[&str]) -> Result<String, SupervisorError> {
        debug!(args = ?args, "systemctl");
        let output = Command::new("systemctl")
            .args(args)
            .output()
            .await
            .map_err(|source| SupervisorError::Spawn {
                program: "systemctl".to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SupervisorError::Command {
                command: format!("systemctl {}", args.join(" ")),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl Supervisor for SystemdSupervisor {
    async fn apply(&self, verb: Verb, unit_instance: &str) -> Result<(), SupervisorError> {
        let unit = self.unit(unit_instance);
        self.run_systemctl(&[verb.as_str(), &unit]).await?;
        Ok(())
    }

    async fn query(&self, unit_instance: &str) -> Result<UnitState, SupervisorError> {
        let unit = self.unit(unit_instance);
        let output = self
            .run_systemctl(&[
                "show",
                &unit,
                "--property=ActiveState,MainPID,UnitFileState",
            ])
            .await?;
        parse_show_output(&output)
    }

    async fn reload_units(&self) -> Result<(), SupervisorError> {
        self.run_systemctl(&["daemon-reload"]).await?;
        Ok(())
    }
}

/// Parse `systemctl show --property=...` key=value output.
pub fn parse_show_output(output: &str) -> Result<UnitState, SupervisorError> {
    let mut active_state = None;
    let mut state = UnitState::default();

    for line in output.lines() {
        let Some((key, value)) = line.trim().split_once('=') else {
            continue;
        };
        match key {
            "ActiveState" => active_state = Some(value.to_string()),
            "MainPID" => {
                let pid: u32 = value
                    .parse()
                    .map_err(|_| SupervisorError::Parse(format!("MainPID={value}")))?;
                state.pid = (pid != 0).then_some(pid);
            }
            "UnitFileState" => state.enabled = value.starts_with("enabled"),
            _ => {}
        }
    }

    let active_state =
        active_state.ok_or_else(|| SupervisorError::Parse("missing ActiveState".to_string()))?;
    state.active = matches!(active_state.as_str(), "active" | "reloading");
    if !state.active {
        state.pid = None;
    }
    Ok(state)
}
