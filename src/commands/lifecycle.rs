use std::path::Path;

use anyhow::{bail, Result};

use crate::batch::BatchReport;
use crate::fleet::Fleet;
use crate::platform::SYSTEMCTL;
use crate::registry::TenantIdentity;
use crate::supervisor::Verb;
use crate::ui::{self, report::render_report};

pub async fn run(config_path: Option<&Path>, verb: Verb, selector: Option<u32>) -> Result<()> {
    let (fleet, targets) = super::prepare(config_path, selector, &[SYSTEMCTL])?;
    let report = apply(&fleet, verb, targets).await;
    print!("{}", render_report(&report, |_| verb.done().to_string(), ui::use_color()));
    fail_on_partial(&report)
}

pub async fn apply(fleet: &Fleet, verb: Verb, targets: Vec<TenantIdentity>) -> BatchReport<()> {
    fleet.apply(verb, targets).await
}

/// Turn a batch with failures into a non-zero exit.
pub fn fail_on_partial<T>(report: &BatchReport<T>) -> Result<()> {
    if report.is_success() {
        Ok(())
    } else {
        bail!(
            "{} of {} tenants failed: {}",
            report.failures(),
            report.len(),
            report.failed_ids().join(", ")
        )
    }
}
