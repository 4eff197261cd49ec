pub mod doctor;
pub mod hosts;
pub mod lifecycle;
pub mod logs;
pub mod pairing;
pub mod password;
pub mod provision;
pub mod status;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::config::model::FleetConfig;
use crate::config::{self, resolve::resolve_config};
use crate::fleet::{Backends, Fleet};
use crate::platform::{self, Tool};
use crate::registry::{self, TenantIdentity};

/// Resolve and validate the fleet config.
pub fn load_fleet_config(config_file: Option<&Path>) -> Result<FleetConfig> {
    let path = resolve_config(config_file)?;
    debug!(path = %path.display(), "loading fleet config");
    config::load_validated(&path)
}

/// Shared front half of every tenant command.
///
/// Rejects an out-of-range selector, then checks for the external tools the
/// command needs, before any tenant is touched.
pub fn prepare(
    config_file: Option<&Path>,
    selector: Option<u32>,
    tools: &[Tool],
) -> Result<(Fleet, Vec<TenantIdentity>)> {
    let config = load_fleet_config(config_file)?;
    let targets = registry::resolve_targets(&config, selector)?;
    platform::require_tools(tools)?;
    let backends = Backends::system(&config);
    Ok((Fleet::new(config, backends), targets))
}

/// Like [`prepare`] for commands that address exactly one tenant.
pub fn prepare_one(
    config_file: Option<&Path>,
    ordinal: u32,
    tools: &[Tool],
) -> Result<(Fleet, TenantIdentity)> {
    let config = load_fleet_config(config_file)?;
    let identity = registry::identity_of(&config, ordinal)?;
    platform::require_tools(tools)?;
    let backends = Backends::system(&config);
    Ok((Fleet::new(config, backends), identity))
}
