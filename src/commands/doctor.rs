use std::path::Path;

use anyhow::Result;

use crate::config::model::FleetConfig;
use crate::platform::{find_tool, ALL_TOOLS};

/// Report host tools and, when a fleet config resolves, the paths it
/// depends on. Never fails; missing pieces are listed instead.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    println!("tenantctl doctor");
    println!("================");
    println!();

    let mut all_ok = true;

    for tool in ALL_TOOLS {
        match find_tool(tool.name) {
            Some(path) => println!("  [ok] {:<16} {}", tool.name, path.display()),
            None => {
                println!("  [!!] {:<16} not found ({})", tool.name, tool.purpose);
                all_ok = false;
            }
        }
    }

    println!();
    match super::load_fleet_config(config_path) {
        Ok(config) => {
            for check in config_checks(&config) {
                all_ok &= check.ok;
                let tag = if check.ok { "[ok]" } else { "[!!]" };
                println!("  {} {:<16} {}", tag, check.label, check.detail);
            }
        }
        Err(e) => {
            println!("  [!!] {:<16} {:#}", "config", e);
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("All dependencies found.");
    } else {
        println!("Some dependencies are missing. Tenant commands that need them will refuse to run.");
    }

    Ok(())
}

pub struct Check {
    pub label: &'static str,
    pub ok: bool,
    pub detail: String,
}

/// Paths and programs named by the config that must exist on this host.
pub fn config_checks(config: &FleetConfig) -> Vec<Check> {
    let mut checks = vec![
        Check {
            label: "config",
            ok: true,
            detail: format!(
                "{} tenants on ports {}..={}",
                config.fleet.tenant_count,
                config.fleet.base_port,
                u32::from(config.fleet.base_port) + config.fleet.tenant_count.saturating_sub(1)
            ),
        },
        path_check("gateway", &config.gateway.executable, false),
        path_check("routes dir", &config.proxy.routes_dir, true),
        path_check("unit dir", &config.supervisor.unit_dir, true),
    ];

    if let Some(program) = config.proxy.reload_command.first() {
        let found = find_tool(program);
        checks.push(Check {
            label: "proxy reload",
            ok: found.is_some(),
            detail: match found {
                Some(path) => path.display().to_string(),
                None => format!("{program} not found"),
            },
        });
    }
    checks
}

fn path_check(label: &'static str, path: &Path, want_dir: bool) -> Check {
    let ok = if want_dir { path.is_dir() } else { path.is_file() };
    let detail = if ok {
        path.display().to_string()
    } else {
        format!("{} missing", path.display())
    };
    Check { label, ok, detail }
}
