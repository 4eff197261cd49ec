use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "fleet.toml";

/// Walk up the directory tree from `start`, checking for `filename` at each level.
/// Returns the full path to the file if found, or None if the root is reached
/// without finding it.
pub fn find_config(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Per-user fallback location: `$XDG_CONFIG_HOME/tenantctl/fleet.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tenantctl").join(CONFIG_FILENAME))
}

/// Resolve the config file path. If `cli_file` is provided, verify it exists and
/// return it. Otherwise search from the current working directory upward for
/// `fleet.toml`, then fall back to the per-user config location.
pub fn resolve_config(cli_file: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli_file {
        if path.is_file() {
            return Ok(path.canonicalize()?);
        }
        anyhow::bail!("Config file not found: {}", path.display());
    }

    let cwd = std::env::current_dir()?;
    if let Some(found) = find_config(&cwd, CONFIG_FILENAME) {
        return Ok(found);
    }

    match user_config_path() {
        Some(path) if path.is_file() => Ok(path),
        _ => anyhow::bail!(
            "No {} found in {} or any parent directory",
            CONFIG_FILENAME,
            cwd.display()
        ),
    }
}
