//! Pure renderers for the per-tenant artifacts. Every function here is a
//! function of the fleet config and the tenant identity only, so rewriting
//! the outputs on each provisioning run is always safe.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::model::FleetConfig;
use crate::registry::TenantIdentity;

const MANAGED_HEADER: &str = "Managed by tenantctl. Changes are overwritten by `tenantctl provision`.";

/// Gateway configuration file contents (`config.json`).
#[derive(Debug, Serialize)]
struct GatewayTenantConfig<'a> {
    tenant: &'a str,
    bind: &'static str,
    port: u16,
    public_url: String,
    workspace: PathBuf,
    tools_dir: PathBuf,
    logs_dir: PathBuf,
}

pub fn render_gateway_config(config: &FleetConfig, identity: &TenantIdentity) -> String {
    let paths = identity.paths(config);
    let doc = GatewayTenantConfig {
        tenant: &identity.id,
        bind: "127.0.0.1",
        port: identity.port,
        public_url: format!("https://{}", identity.virtual_host(config)),
        workspace: paths.workspace,
        tools_dir: paths.tools,
        logs_dir: paths.logs,
    };
    // Serializing plain strings, paths and integers cannot fail.
    let mut out = serde_json::to_string_pretty(&doc).unwrap_or_default();
    out.push('\n');
    out
}

/// Quote an env file value when it contains characters the supervisor's
/// EnvironmentFile parser would otherwise split on or interpret.
fn env_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '#' | '$'));
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Environment file loaded by the unit template (`gateway.env`).
///
/// Fleet-wide extra variables from `[gateway.env]` come last, in key order,
/// and may not override the tenant-specific ones.
pub fn render_env_file(config: &FleetConfig, identity: &TenantIdentity) -> String {
    let paths = identity.paths(config);
    let core = [
        ("GATEWAY_TENANT", identity.id.clone()),
        ("GATEWAY_BIND", "127.0.0.1".to_string()),
        ("GATEWAY_PORT", identity.port.to_string()),
        ("GATEWAY_CONFIG", paths.config_file.display().to_string()),
        ("GATEWAY_WORKSPACE", paths.workspace.display().to_string()),
        ("GATEWAY_TOOLS_DIR", paths.tools.display().to_string()),
        ("GATEWAY_LOGS_DIR", paths.logs.display().to_string()),
        (
            "GATEWAY_PUBLIC_URL",
            format!("https://{}", identity.virtual_host(config)),
        ),
        ("HOME", paths.root.display().to_string()),
    ];

    let mut out = format!("# {MANAGED_HEADER}\n");
    for (key, value) in &core {
        out.push_str(&format!("{}={}\n", key, env_value(value)));
    }
    for (key, value) in &config.gateway.env {
        if core.iter().any(|(k, _)| *k == key.as_str()) {
            continue;
        }
        out.push_str(&format!("{}={}\n", key, env_value(value)));
    }
    out
}

/// Reverse-proxy binding of a public hostname to a tenant's local port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub tenant_id: String,
    pub virtual_host: String,
    pub upstream_port: u16,
    pub credential_store_ref: PathBuf,
}

impl RouteEntry {
    pub fn for_tenant(config: &FleetConfig, identity: &TenantIdentity) -> Self {
        Self {
            tenant_id: identity.id.clone(),
            virtual_host: identity.virtual_host(config),
            upstream_port: identity.port,
            credential_store_ref: identity.paths(config).credential_file,
        }
    }

    /// nginx server block for this route.
    pub fn render(&self) -> String {
        let mut out = format!("# {MANAGED_HEADER}\n");
        out.push_str("server {\n");
        out.push_str("    listen 80;\n");
        out.push_str("    listen [::]:80;\n");
        out.push_str(&format!("    server_name {};\n", self.virtual_host));
        out.push('\n');
        out.push_str("    location / {\n");
        out.push_str(&format!("        auth_basic \"{}\";\n", self.tenant_id));
        out.push_str(&format!(
            "        auth_basic_user_file {};\n",
            self.credential_store_ref.display()
        ));
        out.push_str(&format!(
            "        proxy_pass http://127.0.0.1:{};\n",
            self.upstream_port
        ));
        out.push_str("        proxy_http_version 1.1;\n");
        out.push_str("        proxy_set_header Upgrade $http_upgrade;\n");
        out.push_str("        proxy_set_header Connection \"upgrade\";\n");
        out.push_str("        proxy_set_header Host $host;\n");
        out.push_str("        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;\n");
        out.push_str("        proxy_set_header X-Forwarded-Proto $scheme;\n");
        out.push_str("        proxy_read_timeout 3600s;\n");
        out.push_str("    }\n");
        out.push_str("}\n");
        out
    }
}
