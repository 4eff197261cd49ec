use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::supervisor::unit::instance_unit;

/// Read access to each tenant's append-only log stream.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// The most recent `lines` lines, oldest first.
    async fn tail(&self, unit_instance: &str, lines: usize) -> Result<Vec<String>>;

    /// Send the last `lines` lines, then every new line, into `tx` until
    /// `cancel` fires, the receiver goes away, or the stream ends.
    async fn follow(
        &self,
        unit_instance: &str,
        lines: usize,
        tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<()>;
}

/// [`LogSource`] reading from journald via `journalctl`.
pub struct JournalLogSource {
    unit_name: String,
}

impl JournalLogSource {
    pub fn new(unit_name: &str) -> Self {
        Self {
            unit_name: unit_name.to_string(),
        }
    }

    fn base_args(&self, unit_instance: &str, lines: usize) -> Vec<String> {
        vec![
            "--unit".to_string(),
            instance_unit(&self.unit_name, unit_instance),
            "--lines".to_string(),
            lines.to_string(),
            "--output".to_string(),
            "cat".to_string(),
            "--no-pager".to_string(),
            "--quiet".to_string(),
        ]
    }
}

#[async_trait]
impl LogSource for JournalLogSource {
    async fn tail(&self, unit_instance: &str, lines: usize) -> Result<Vec<String>> {
        let output = Command::new("journalctl")
            .args(self.base_args(unit_instance, lines))
            .output()
            .await
            .context("running journalctl")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("journalctl failed for {}: {}", unit_instance, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    async fn follow(
        &self,
        unit_instance: &str,
        lines: usize,
        tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let mut args = self.base_args(unit_instance, lines);
        args.push("--follow".to_string());

        let mut child = Command::new("journalctl")
            .args(&args)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawning journalctl --follow")?;

        let stdout = child
            .stdout
            .take()
            .context("journalctl stdout was not captured")?;
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();

        loop {
            line.clear();
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(tenant = %unit_instance, "log follow cancelled");
                    break;
                }
                read = reader.read_line(&mut line) => {
                    match read {
                        Ok(0) => break, // EOF
                        Ok(_) => {
                            let text = line.trim_end_matches('\n').to_string();
                            if tx.send(text).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(tenant = %unit_instance, error = %e, "journal read error");
                            break;
                        }
                    }
                }
            }
        }

        let _ = child.kill().await;
        let _ = child.wait().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journalctl_args_target_the_instance_unit() {
        let source = JournalLogSource::new("gateway");
        let args = source.base_args("user-002", 50);
        assert_eq!(
            args,
            vec![
                "--unit",
                "gateway@user-002.service",
                "--lines",
                "50",
                "--output",
                "cat",
                "--no-pager",
                "--quiet",
            ]
        );
    }
}
