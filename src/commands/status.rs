use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::fleet::Fleet;
use crate::platform::{JOURNALCTL, SYSTEMCTL};
use crate::registry::TenantIdentity;
use crate::ui::{self, status::render_status_table};

pub async fn run(config_path: Option<&Path>, selector: Option<u32>, format: OutputFormat) -> Result<()> {
    let (fleet, targets) = super::prepare(config_path, selector, &[SYSTEMCTL, JOURNALCTL])?;
    print!("{}", render(&fleet, targets, format, ui::use_color()).await?);
    Ok(())
}

/// Query every target and render the result. Unreachable tenants still get a
/// row with unknown fields.
pub async fn render(
    fleet: &Fleet,
    targets: Vec<TenantIdentity>,
    format: OutputFormat,
    use_color: bool,
) -> Result<String> {
    let rows = fleet.status(targets).await;
    match format {
        OutputFormat::Table => Ok(render_status_table(&rows, use_color)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&rows).context("serializing status")?;
            json.push('\n');
            Ok(json)
        }
    }
}
