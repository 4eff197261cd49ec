use std::path::Path;

use anyhow::Result;

use crate::config::model::FleetConfig;
use crate::registry::identities_for;

pub fn run(config_path: Option<&Path>, certbot: bool) -> Result<()> {
    let config = super::load_fleet_config(config_path)?;
    print!("{}", render(&config, certbot)?);
    Ok(())
}

/// Every tenant's public hostname, one per line, or a single certbot
/// invocation covering all of them.
pub fn render(config: &FleetConfig, certbot: bool) -> Result<String> {
    let hosts: Vec<String> = identities_for(config)?
        .iter()
        .map(|identity| identity.virtual_host(config))
        .collect();

    if certbot {
        let mut cmd = format!(
            "certbot certonly --nginx --non-interactive --agree-tos -m {}",
            config.fleet.cert_issuer_email
        );
        for host in &hosts {
            cmd.push_str(" -d ");
            cmd.push_str(host);
        }
        cmd.push('\n');
        Ok(cmd)
    } else {
        Ok(hosts.iter().map(|h| format!("{h}\n")).collect())
    }
}
