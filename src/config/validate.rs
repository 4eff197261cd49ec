// The miette/thiserror derive macros generate code that triggers false
// positive unused_assignments warnings on enum variant fields.
#![allow(unused_assignments)]

use std::sync::LazyLock;

use miette::{Diagnostic, NamedSource, SourceSpan};
use regex::Regex;
use thiserror::Error;

use crate::config::model::FleetConfig;

static ID_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("valid regex"));

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*$")
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// ConfigDiagnostic: miette-powered validation error
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigDiagnostic {
    #[error("tenant_count must be at least 1")]
    #[diagnostic(code(tenantctl::zero_tenants))]
    ZeroTenants {
        #[source_code]
        src: NamedSource<String>,
        #[label("no tenants to manage")]
        span: SourceSpan,
    },

    #[error("ports {base_port}..={last_port} do not fit in the TCP port range")]
    #[diagnostic(
        code(tenantctl::port_range_overflow),
        help("lower base_port or tenant_count so the last tenant's port is at most 65535")
    )]
    PortRangeOverflow {
        #[source_code]
        src: NamedSource<String>,
        #[label("base port")]
        span: SourceSpan,
        base_port: u16,
        last_port: u64,
    },

    #[error("base_port must not be 0")]
    #[diagnostic(code(tenantctl::zero_base_port))]
    ZeroBasePort {
        #[source_code]
        src: NamedSource<String>,
        #[label("port 0 is not a listenable port")]
        span: SourceSpan,
    },

    #[error("id_width {width} cannot hold {tenant_count} tenants")]
    #[diagnostic(
        code(tenantctl::id_width_too_small),
        help("tenant ids are fixed width; use id_width = {needed} or more")
    )]
    IdWidthTooSmall {
        #[source_code]
        src: NamedSource<String>,
        #[label("too narrow")]
        span: SourceSpan,
        width: usize,
        tenant_count: u32,
        needed: usize,
    },

    #[error("invalid id_prefix `{value}`")]
    #[diagnostic(
        code(tenantctl::invalid_id_prefix),
        help("the prefix becomes part of unit names and hostnames: lowercase letters, digits and `-`, starting with a letter")
    )]
    InvalidIdPrefix {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid prefix")]
        span: SourceSpan,
        value: String,
    },

    #[error("invalid domain `{value}`")]
    #[diagnostic(code(tenantctl::invalid_domain))]
    InvalidDomain {
        #[source_code]
        src: NamedSource<String>,
        #[label("not a hostname")]
        span: SourceSpan,
        value: String,
    },

    #[error("invalid cert_issuer_email `{value}`")]
    #[diagnostic(code(tenantctl::invalid_email))]
    InvalidEmail {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected an email address")]
        span: SourceSpan,
        value: String,
    },

    #[error("parallelism must be at least 1")]
    #[diagnostic(code(tenantctl::zero_parallelism))]
    ZeroParallelism {
        #[source_code]
        src: NamedSource<String>,
        #[label("no workers")]
        span: SourceSpan,
    },

    #[error("gateway executable `{value}` is not an absolute path")]
    #[diagnostic(
        code(tenantctl::relative_executable),
        help("the supervisor runs the gateway from each tenant's workspace, so relative paths would resolve per tenant")
    )]
    RelativeExecutable {
        #[source_code]
        src: NamedSource<String>,
        #[label("relative path")]
        span: SourceSpan,
        value: String,
    },

    #[error("gateway pairing_marker must not be empty")]
    #[diagnostic(code(tenantctl::empty_pairing_marker))]
    EmptyPairingMarker {
        #[source_code]
        src: NamedSource<String>,
        #[label("empty marker")]
        span: SourceSpan,
    },

    #[error("install_root `{value}` is not an absolute path")]
    #[diagnostic(code(tenantctl::relative_install_root))]
    RelativeInstallRoot {
        #[source_code]
        src: NamedSource<String>,
        #[label("relative path")]
        span: SourceSpan,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Source span helpers
// ---------------------------------------------------------------------------

/// Find the byte offset of a table header like `[fleet]`.
fn find_table_span(source: &str, section: &str) -> SourceSpan {
    let header = format!("[{}]", section);
    if let Some(pos) = source.find(&header) {
        return (pos + 1, section.len()).into();
    }
    (0, 0).into()
}

/// Find the byte offset of a field value inside a top-level TOML table.
fn find_field_span(source: &str, section: &str, field: &str) -> SourceSpan {
    let header = format!("[{}]", section);
    let search_start = source.find(&header).unwrap_or(0);
    let after_header = &source[search_start..];

    for line_start in line_offsets(after_header) {
        let line = &after_header[line_start..];
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') && line_start > 0 {
            break;
        }
        let Some(rest) = trimmed.strip_prefix(field) else {
            continue;
        };
        if !rest.trim_start().starts_with('=') {
            continue;
        }
        let eq = line.find('=').unwrap_or(0) + 1;
        let value = line[eq..].trim_start();
        let value_start = search_start + line_start + eq + (line[eq..].len() - value.len());
        let value_len = value.find('\n').unwrap_or(value.len());
        return (value_start, value_len.min(value.trim_end().len())).into();
    }

    find_table_span(source, section)
}

fn line_offsets(text: &str) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0).chain(text.match_indices('\n').map(|(i, _)| i + 1))
}

fn digits(n: u32) -> usize {
    n.to_string().len()
}

// ---------------------------------------------------------------------------
// Main validation function
// ---------------------------------------------------------------------------

pub fn validate(
    config: &FleetConfig,
    source: &str,
    filename: &str,
) -> Result<(), Vec<ConfigDiagnostic>> {
    let mut errors = Vec::new();
    let src = NamedSource::new(filename, source.to_string());
    let fleet = &config.fleet;

    if fleet.tenant_count == 0 {
        errors.push(ConfigDiagnostic::ZeroTenants {
            src: src.clone(),
            span: find_field_span(source, "fleet", "tenant_count"),
        });
    }

    if fleet.base_port == 0 {
        errors.push(ConfigDiagnostic::ZeroBasePort {
            src: src.clone(),
            span: find_field_span(source, "fleet", "base_port"),
        });
    } else {
        let last_port = u64::from(fleet.base_port) + u64::from(fleet.tenant_count.max(1)) - 1;
        if last_port > u64::from(u16::MAX) {
            errors.push(ConfigDiagnostic::PortRangeOverflow {
                src: src.clone(),
                span: find_field_span(source, "fleet", "base_port"),
                base_port: fleet.base_port,
                last_port,
            });
        }
    }

    let needed = digits(fleet.tenant_count);
    if fleet.id_width < needed {
        errors.push(ConfigDiagnostic::IdWidthTooSmall {
            src: src.clone(),
            span: find_field_span(source, "fleet", "id_width"),
            width: fleet.id_width,
            tenant_count: fleet.tenant_count,
            needed,
        });
    }

    if !ID_PREFIX_RE.is_match(&fleet.id_prefix) {
        errors.push(ConfigDiagnostic::InvalidIdPrefix {
            src: src.clone(),
            span: find_field_span(source, "fleet", "id_prefix"),
            value: fleet.id_prefix.clone(),
        });
    }

    if !DOMAIN_RE.is_match(&fleet.domain) {
        errors.push(ConfigDiagnostic::InvalidDomain {
            src: src.clone(),
            span: find_field_span(source, "fleet", "domain"),
            value: fleet.domain.clone(),
        });
    }

    let email_ok = fleet
        .cert_issuer_email
        .split_once('@')
        .is_some_and(|(local, host)| !local.is_empty() && host.contains('.'));
    if !email_ok {
        errors.push(ConfigDiagnostic::InvalidEmail {
            src: src.clone(),
            span: find_field_span(source, "fleet", "cert_issuer_email"),
            value: fleet.cert_issuer_email.clone(),
        });
    }

    if fleet.parallelism == 0 {
        errors.push(ConfigDiagnostic::ZeroParallelism {
            src: src.clone(),
            span: find_field_span(source, "fleet", "parallelism"),
        });
    }

    if !fleet.install_root.is_absolute() {
        errors.push(ConfigDiagnostic::RelativeInstallRoot {
            src: src.clone(),
            span: find_field_span(source, "fleet", "install_root"),
            value: fleet.install_root.display().to_string(),
        });
    }

    if !config.gateway.executable.is_absolute() {
        errors.push(ConfigDiagnostic::RelativeExecutable {
            src: src.clone(),
            span: find_field_span(source, "gateway", "executable"),
            value: config.gateway.executable.display().to_string(),
        });
    }

    if config.gateway.pairing_marker.trim().is_empty() {
        errors.push(ConfigDiagnostic::EmptyPairingMarker {
            src: src.clone(),
            span: find_field_span(source, "gateway", "pairing_marker"),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_and_validate(toml_str: &str) -> Result<(), Vec<ConfigDiagnostic>> {
        let config: FleetConfig = toml::from_str(toml_str).unwrap();
        validate(&config, toml_str, "fleet.toml")
    }

    fn fleet_toml(extra: &str) -> String {
        format!(
            r#"
[fleet]
tenant_count = 3
base_port = 8080
domain = "gw.example.com"
cert_issuer_email = "ops@example.com"
{extra}
"#
        )
    }

    #[test]
    fn valid_config_passes() {
        assert!(parse_and_validate(&fleet_toml("")).is_ok());
    }

    #[test]
    fn zero_tenants_rejected() {
        let toml_str = fleet_toml("").replace("tenant_count = 3", "tenant_count = 0");
        let errs = parse_and_validate(&toml_str).unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ConfigDiagnostic::ZeroTenants { .. })));
    }

    #[test]
    fn port_range_overflow_rejected() {
        let toml_str = fleet_toml("")
            .replace("base_port = 8080", "base_port = 65534")
            .replace("tenant_count = 3", "tenant_count = 5");
        let errs = parse_and_validate(&toml_str).unwrap_err();
        let overflow = errs
            .iter()
            .find(|e| matches!(e, ConfigDiagnostic::PortRangeOverflow { .. }))
            .expect("expected PortRangeOverflow");
        if let ConfigDiagnostic::PortRangeOverflow { last_port, .. } = overflow {
            assert_eq!(*last_port, 65538);
        }
    }

    #[test]
    fn last_port_exactly_max_is_fine() {
        let toml_str = fleet_toml("")
            .replace("base_port = 8080", "base_port = 65533")
            .replace("tenant_count = 3", "tenant_count = 3");
        assert!(parse_and_validate(&toml_str).is_ok());
    }

    #[test]
    fn id_width_must_hold_tenant_count() {
        let toml_str = fleet_toml("id_width = 2").replace("tenant_count = 3", "tenant_count = 100");
        let errs = parse_and_validate(&toml_str).unwrap_err();
        assert!(errs.iter().any(|e| matches!(
            e,
            ConfigDiagnostic::IdWidthTooSmall { needed: 3, .. }
        )));
    }

    #[test]
    fn bad_prefix_rejected() {
        let errs = parse_and_validate(&fleet_toml("id_prefix = \"User_\"")).unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ConfigDiagnostic::InvalidIdPrefix { .. })));
    }

    #[test]
    fn bad_domain_and_email_reported_together() {
        let toml_str = fleet_toml("")
            .replace("gw.example.com", "not a domain")
            .replace("ops@example.com", "ops");
        let errs = parse_and_validate(&toml_str).unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ConfigDiagnostic::InvalidDomain { .. })));
        assert!(errs
            .iter()
            .any(|e| matches!(e, ConfigDiagnostic::InvalidEmail { .. })));
    }

    #[test]
    fn relative_executable_rejected() {
        let toml_str = format!("{}\n[gateway]\nexecutable = \"bin/gw\"\n", fleet_toml(""));
        let errs = parse_and_validate(&toml_str).unwrap_err();
        assert!(errs
            .iter()
            .any(|e| matches!(e, ConfigDiagnostic::RelativeExecutable { .. })));
    }

    #[test]
    fn field_span_points_at_value() {
        let source = fleet_toml("");
        let span = find_field_span(&source, "fleet", "base_port");
        let start = span.offset();
        assert_eq!(&source[start..start + span.len()], "8080");
    }

    #[test]
    fn field_span_falls_back_to_table() {
        let source = fleet_toml("");
        let span = find_field_span(&source, "fleet", "parallelism");
        assert_eq!(&source[span.offset()..span.offset() + span.len()], "fleet");
    }
}
