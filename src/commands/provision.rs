use std::path::Path;

use anyhow::{bail, Result};
use owo_colors::OwoColorize;

use crate::credentials::ledger_path;
use crate::fleet::{Fleet, ProvisionReport};
use crate::platform::{HTPASSWD, SYSTEMCTL};
use crate::provision::ProvisionOutcome;
use crate::ui::{self, report::render_report};

pub async fn run(config_path: Option<&Path>, selector: Option<u32>) -> Result<()> {
    let (fleet, targets) = super::prepare(config_path, selector, &[SYSTEMCTL, HTPASSWD])?;
    let report = fleet.provision(targets).await;
    print!("{}", render(&fleet, &report, ui::use_color()));

    if !report.is_success() {
        bail!(
            "provisioning incomplete: {} of {} tenants failed",
            report.tenants.failures(),
            report.tenants.len()
        );
    }
    Ok(())
}

/// Per-tenant lines, then the fleet-wide steps, then a reminder about the
/// plaintext ledger when new secrets were written to it.
pub fn render(fleet: &Fleet, report: &ProvisionReport, use_color: bool) -> String {
    let mut out = render_report(&report.tenants, |outcome| outcome.to_string(), use_color);
    out.push('\n');

    let step = |label: &str, result: std::result::Result<String, String>| -> String {
        match result {
            Ok(detail) => format!("  [ok] {label:<16} {detail}\n"),
            Err(e) if use_color => format!("  {} {label:<16} {e}\n", "[!!]".red()),
            Err(e) => format!("  [!!] {label:<16} {e}\n"),
        }
    };

    out.push_str(&step(
        "unit template",
        report
            .unit_template
            .as_ref()
            .map(|_| "written".to_string())
            .map_err(|e| format!("{e:#}")),
    ));
    out.push_str(&step(
        "unit reload",
        report
            .units_reloaded
            .as_ref()
            .map(|_| "done".to_string())
            .map_err(|e| format!("{e:#}")),
    ));
    out.push_str(&step(
        "proxy reload",
        report
            .proxy_reloaded
            .as_ref()
            .map(|reloaded| {
                if *reloaded {
                    "done".to_string()
                } else {
                    "skipped (no reload command configured)".to_string()
                }
            })
            .map_err(|e| format!("{e:#}")),
    ));

    let created = report
        .tenants
        .entries
        .iter()
        .filter(|e| matches!(e.outcome, Ok(ProvisionOutcome::Created)))
        .count();
    if created > 0 {
        let ledger = ledger_path(&fleet.config().fleet.install_root);
        out.push_str(&format!(
            "\n  {created} new credential(s) recorded in {}\n  Hand them out, then delete that file.\n",
            ledger.display()
        ));
    }
    out
}
