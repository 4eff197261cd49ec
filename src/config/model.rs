use serde::{de, Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    pub fleet: FleetSection,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FleetSection {
    pub tenant_count: u32,
    pub base_port: u16,
    pub domain: String,
    pub cert_issuer_email: String,
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,
    #[serde(default = "default_service_user")]
    pub service_user: String,
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    #[serde(default = "default_id_width")]
    pub id_width: usize,
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    #[serde(
        default = "default_query_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub query_timeout: Duration,
}

fn default_install_root() -> PathBuf {
    PathBuf::from("/opt/gateway-fleet")
}

fn default_service_user() -> String {
    "gateway".to_string()
}

fn default_id_prefix() -> String {
    "user".to_string()
}

fn default_id_width() -> usize {
    3
}

fn default_parallelism() -> usize {
    8
}

fn default_query_timeout() -> Duration {
    Duration::from_secs(5)
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GatewayConfig {
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_pairing_marker")]
    pub pairing_marker: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_executable() -> PathBuf {
    PathBuf::from("/usr/local/bin/gateway")
}

fn default_pairing_marker() -> String {
    "pairing code".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            args: Vec::new(),
            pairing_marker: default_pairing_marker(),
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProxyConfig {
    #[serde(default = "default_routes_dir")]
    pub routes_dir: PathBuf,
    #[serde(default = "default_credentials_dir")]
    pub credentials_dir: PathBuf,
    #[serde(default = "default_reload_command")]
    pub reload_command: Vec<String>,
}

fn default_routes_dir() -> PathBuf {
    PathBuf::from("/etc/nginx/conf.d")
}

fn default_credentials_dir() -> PathBuf {
    PathBuf::from("/etc/nginx/htpasswd")
}

fn default_reload_command() -> Vec<String> {
    vec!["nginx".to_string(), "-s".to_string(), "reload".to_string()]
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            routes_dir: default_routes_dir(),
            credentials_dir: default_credentials_dir(),
            reload_command: default_reload_command(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SupervisorConfig {
    #[serde(default = "default_unit_name")]
    pub unit_name: String,
    #[serde(default = "default_unit_dir")]
    pub unit_dir: PathBuf,
    #[serde(default = "default_restart_sec")]
    pub restart_sec: u64,
    #[serde(default = "default_start_limit_burst")]
    pub start_limit_burst: u32,
    #[serde(default = "default_start_limit_interval_sec")]
    pub start_limit_interval_sec: u64,
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: usize,
}

fn default_unit_name() -> String {
    "gateway".to_string()
}

fn default_unit_dir() -> PathBuf {
    PathBuf::from("/etc/systemd/system")
}

fn default_restart_sec() -> u64 {
    5
}

fn default_start_limit_burst() -> u32 {
    5
}

fn default_start_limit_interval_sec() -> u64 {
    300
}

fn default_log_tail_lines() -> usize {
    50
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            unit_name: default_unit_name(),
            unit_dir: default_unit_dir(),
            restart_sec: default_restart_sec(),
            start_limit_burst: default_start_limit_burst(),
            start_limit_interval_sec: default_start_limit_interval_sec(),
            log_tail_lines: default_log_tail_lines(),
        }
    }
}

/// Accepts either a humantime string (`"5s"`, `"1500ms"`) or an integer
/// number of milliseconds.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl<'de> de::Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a duration string like \"5s\" or milliseconds")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Duration, E> {
            humantime::parse_duration(value).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Duration, E> {
            u64::try_from(value)
                .map(Duration::from_millis)
                .map_err(|_| E::custom("duration must not be negative"))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Duration, E> {
            Ok(Duration::from_millis(value))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}
