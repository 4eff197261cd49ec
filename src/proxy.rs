use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::info;

/// Signal the reverse proxy to re-read its route files.
///
/// Returns `Ok(false)` without running anything when no reload command is
/// configured.
pub async fn reload(command: &[String]) -> Result<bool> {
    let Some((program, args)) = command.split_first() else {
        return Ok(false);
    };

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("running proxy reload `{}`", command.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "proxy reload `{}` failed ({}): {}",
            command.join(" "),
            output.status,
            stderr.trim()
        );
    }

    info!(command = %command.join(" "), "reverse proxy reloaded");
    Ok(true)
}
