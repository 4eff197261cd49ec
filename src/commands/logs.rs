use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::fleet::Fleet;
use crate::platform::JOURNALCTL;
use crate::registry::TenantIdentity;

const CHANNEL_CAPACITY: usize = 256;

pub async fn run(config_path: Option<&Path>, ordinal: u32, lines: usize, follow: bool) -> Result<()> {
    let (fleet, identity) = super::prepare_one(config_path, ordinal, &[JOURNALCTL])?;

    if !follow {
        let recent = fleet.tail_logs(&identity, lines).await?;
        let mut out = std::io::stdout().lock();
        for line in recent {
            writeln!(out, "{line}")?;
        }
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, stopping log follow");
                cancel.cancel();
            }
        })
    };

    let result = stream(&fleet, &identity, lines, cancel, std::io::stdout()).await;
    watcher.abort();
    result
}

/// Follow one tenant's log into `out` until `cancel` fires or the source ends.
pub async fn stream<W: Write>(
    fleet: &Fleet,
    identity: &TenantIdentity,
    lines: usize,
    cancel: CancellationToken,
    out: W,
) -> Result<()> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (followed, printed) = tokio::join!(
        fleet.follow_logs(identity, lines, tx, cancel),
        print_lines(rx, out)
    );
    followed.with_context(|| format!("following logs for {}", identity.id))?;
    printed
}

async fn print_lines<W: Write>(mut rx: mpsc::Receiver<String>, mut out: W) -> Result<()> {
    while let Some(line) = rx.recv().await {
        writeln!(out, "{line}")?;
        out.flush()?;
    }
    Ok(())
}
