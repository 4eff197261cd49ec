pub mod model;
pub mod resolve;
pub mod validate;

use std::path::Path;

use anyhow::bail;
use model::FleetConfig;
use validate::ConfigDiagnostic;

/// Read and parse a fleet config, returning the parsed config alongside the
/// raw source so validation diagnostics can point into it.
pub fn load_config(path: &Path) -> anyhow::Result<(FleetConfig, String)> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
    let config: FleetConfig = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
    Ok((config, content))
}

/// Name shown in diagnostics for a config path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| resolve::CONFIG_FILENAME.to_string())
}

/// Render diagnostics through miette so spans, codes and help text are kept.
pub fn render_diagnostics(errors: Vec<ConfigDiagnostic>) -> String {
    errors
        .into_iter()
        .map(|err| {
            let report: miette::Report = err.into();
            format!("{:?}", report)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load a config and run validation, folding every diagnostic into one error.
pub fn load_validated(path: &Path) -> anyhow::Result<FleetConfig> {
    let (config, source) = load_config(path)?;
    let filename = display_name(path);

    if let Err(errors) = validate::validate(&config, &source, &filename) {
        bail!(
            "Configuration errors in {}:\n\n{}",
            filename,
            render_diagnostics(errors).trim_end()
        );
    }

    Ok(config)
}
