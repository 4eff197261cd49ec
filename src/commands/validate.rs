use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use std::path::Path;

use crate::config::resolve::resolve_config;
use crate::config::validate::validate;
use crate::config::{self, display_name, render_diagnostics};

pub fn run(config_file: Option<&Path>) -> Result<()> {
    let config_path = resolve_config(config_file)?;
    let (config, source) = config::load_config(&config_path)?;
    let filename = display_name(&config_path);

    match validate(&config, &source, &filename) {
        Ok(()) => {
            println!(
                "  {} {} is valid ({} tenants, ports {}-{})",
                "\u{2713}".green(),
                filename,
                config.fleet.tenant_count,
                config.fleet.base_port,
                u32::from(config.fleet.base_port) + config.fleet.tenant_count - 1,
            );
            Ok(())
        }
        Err(errors) => {
            let count = errors.len();
            eprintln!("{}", render_diagnostics(errors));
            bail!("{} has {} configuration error(s)", filename, count);
        }
    }
}
