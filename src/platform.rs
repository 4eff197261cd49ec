use std::path::PathBuf;

use crate::error::FleetError;

/// An external program tenantctl shells out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    pub name: &'static str,
    pub purpose: &'static str,
}

pub const SYSTEMCTL: Tool = Tool {
    name: "systemctl",
    purpose: "process supervision",
};

pub const JOURNALCTL: Tool = Tool {
    name: "journalctl",
    purpose: "tenant logs and pairing tokens",
};

pub const HTPASSWD: Tool = Tool {
    name: "htpasswd",
    purpose: "hashing tenant credentials",
};

pub const ALL_TOOLS: &[Tool] = &[SYSTEMCTL, JOURNALCTL, HTPASSWD];

/// Locate `name` on `PATH` (or as a path, if it contains a separator).
pub fn find_tool(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Fail with `MissingEnvironment` for the first tool that cannot be found.
/// Called before any tenant is touched.
pub fn require_tools(tools: &[Tool]) -> Result<(), FleetError> {
    for tool in tools {
        if find_tool(tool.name).is_none() {
            return Err(FleetError::MissingEnvironment {
                tool: tool.name.to_string(),
                purpose: tool.purpose.to_string(),
            });
        }
    }
    Ok(())
}
