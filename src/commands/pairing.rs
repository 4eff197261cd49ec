use std::path::Path;

use anyhow::Result;

use crate::platform::{JOURNALCTL, SYSTEMCTL};
use crate::ui::status::render_pairing_lines;

pub async fn run(config_path: Option<&Path>, selector: Option<u32>) -> Result<()> {
    let (fleet, targets) = super::prepare(config_path, selector, &[SYSTEMCTL, JOURNALCTL])?;
    let rows = fleet.status(targets).await;
    print!("{}", render_pairing_lines(&rows));
    Ok(())
}
