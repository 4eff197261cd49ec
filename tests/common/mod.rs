#![allow(dead_code)]
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A fleet config in a temp dir with every host path redirected inside it.
pub struct TestFleet {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl TestFleet {
    pub fn new(tenant_count: u32) -> Self {
        Self::with_extra(tenant_count, "")
    }

    /// Like [`TestFleet::new`] with extra TOML appended to the `[fleet]` table.
    pub fn with_extra(tenant_count: u32, fleet_extra: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().display().to_string();
        let config = format!(
            r#"
[fleet]
tenant_count = {tenant_count}
base_port = 18080
domain = "gw.example.com"
cert_issuer_email = "ops@example.com"
install_root = "{root}/srv"
{fleet_extra}

[proxy]
routes_dir = "{root}/nginx/conf.d"
credentials_dir = "{root}/nginx/htpasswd"
reload_command = []

[supervisor]
unit_dir = "{root}/systemd"
"#
        );
        let config_path = dir.path().join("fleet.toml");
        std::fs::write(&config_path, config).unwrap();
        Self { dir, config_path }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `tenantctl -f <config>` with a clean environment for log filtering.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tenantctl").unwrap();
        cmd.env_remove("RUST_LOG")
            .env_remove("TENANTCTL_CONFIG")
            .arg("-f")
            .arg(&self.config_path);
        cmd
    }

    /// Entries directly under the temp root, excluding the config file.
    pub fn created_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name != "fleet.toml")
            .collect();
        names.sort();
        names
    }
}
