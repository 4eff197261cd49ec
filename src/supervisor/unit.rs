use std::path::PathBuf;

use crate::config::model::FleetConfig;
use crate::registry::tenants_root;

/// Path of the shared template unit, e.g. `/etc/systemd/system/gateway@.service`.
pub fn template_path(config: &FleetConfig) -> PathBuf {
    config
        .supervisor
        .unit_dir
        .join(format!("{}@.service", config.supervisor.unit_name))
}

/// Full unit name for one tenant instance of the `template` unit.
pub fn instance_unit(template: &str, unit_instance: &str) -> String {
    format!("{template}@{unit_instance}.service")
}

/// Quote one ExecStart argument when it contains whitespace or quotes.
fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Render the systemd template unit shared by every tenant.
///
/// Tenant paths are bound through `%i`, the instance name, which is the
/// tenant id. The restart policy backs off with `RestartSec` and gives up
/// after `StartLimitBurst` failures inside `StartLimitIntervalSec`.
pub fn render_unit_template(config: &FleetConfig) -> String {
    let root = tenants_root(config);
    let tenant_dir = root.join("%i");
    let sup = &config.supervisor;

    let mut exec = vec![quote_arg(&config.gateway.executable.to_string_lossy())];
    exec.extend(config.gateway.args.iter().map(|a| quote_arg(a)));
    exec.push("--config".to_string());
    exec.push(quote_arg(&tenant_dir.join("config.json").to_string_lossy()));

    let mut out = String::new();
    out.push_str("# Managed by tenantctl. Changes are overwritten by `tenantctl provision`.\n");
    out.push_str("[Unit]\n");
    out.push_str(&format!("Description=Gateway tenant %i ({})\n", config.fleet.domain));
    out.push_str("After=network-online.target\n");
    out.push_str("Wants=network-online.target\n");
    out.push_str(&format!("StartLimitIntervalSec={}\n", sup.start_limit_interval_sec));
    out.push_str(&format!("StartLimitBurst={}\n", sup.start_limit_burst));
    out.push('\n');
    out.push_str("[Service]\n");
    out.push_str("Type=simple\n");
    out.push_str(&format!("User={}\n", config.fleet.service_user));
    out.push_str(&format!(
        "WorkingDirectory={}\n",
        tenant_dir.join("workspace").display()
    ));
    out.push_str(&format!(
        "EnvironmentFile={}\n",
        tenant_dir.join("gateway.env").display()
    ));
    out.push_str(&format!("ExecStart={}\n", exec.join(" ")));
    out.push_str("Restart=on-failure\n");
    out.push_str(&format!("RestartSec={}\n", sup.restart_sec));
    out.push_str("SyslogIdentifier=gateway-%i\n");
    out.push('\n');
    out.push_str("[Install]\n");
    out.push_str("WantedBy=multi-user.target\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fleet_config;
    use std::path::Path;

    #[test]
    fn template_binds_tenant_paths_through_instance() {
        let config = fleet_config(Path::new("/srv/fleet"), 3, 8080);
        let unit = render_unit_template(&config);
        assert!(unit.contains("WorkingDirectory=/srv/fleet/tenants/%i/workspace\n"));
        assert!(unit.contains("EnvironmentFile=/srv/fleet/tenants/%i/gateway.env\n"));
        assert!(unit.contains(
            "ExecStart=/usr/local/bin/gateway --config /srv/fleet/tenants/%i/config.json\n"
        ));
        assert!(unit.contains(&format!("User={}\n", config.fleet.service_user)));
        assert!(unit.contains("Restart=on-failure\n"));
        assert!(unit.contains("StartLimitBurst=5\n"));
    }

    #[test]
    fn exec_args_with_spaces_are_quoted() {
        let mut config = fleet_config(Path::new("/srv/fleet"), 1, 8080);
        config.gateway.args = vec!["serve".to_string(), "--name".to_string(), "my gw".to_string()];
        let unit = render_unit_template(&config);
        assert!(unit.contains("ExecStart=/usr/local/bin/gateway serve --name \"my gw\" --config"));
    }

    #[test]
    fn unit_names() {
        let config = fleet_config(Path::new("/srv/fleet"), 1, 8080);
        assert_eq!(
            instance_unit(&config.supervisor.unit_name, "user-001"),
            "gateway@user-001.service"
        );
        assert!(template_path(&config).ends_with("gateway@.service"));
    }
}
