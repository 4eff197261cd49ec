use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tenantctl", version, about = "Multi-tenant gateway fleet manager")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Use a specific fleet config file
    #[arg(short = 'f', long = "file", global = true, env = "TENANTCTL_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start tenant gateways (all tenants if no number is given)
    Start {
        /// Tenant number, 1-based
        tenant: Option<u32>,
    },
    /// Stop tenant gateways
    Stop {
        /// Tenant number, 1-based
        tenant: Option<u32>,
    },
    /// Restart tenant gateways
    Restart {
        /// Tenant number, 1-based
        tenant: Option<u32>,
    },
    /// Start tenant gateways at boot
    Enable {
        /// Tenant number, 1-based
        tenant: Option<u32>,
    },
    /// Stop starting tenant gateways at boot
    Disable {
        /// Tenant number, 1-based
        tenant: Option<u32>,
    },
    /// Show live status of tenant gateways
    Status {
        /// Tenant number, 1-based
        tenant: Option<u32>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show and follow one tenant's gateway log
    Logs {
        /// Tenant number, 1-based
        tenant: u32,

        /// Number of recent lines to show first
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,

        /// Print the recent lines and exit
        #[arg(long)]
        no_follow: bool,
    },
    /// Set a new access password for one tenant
    Password {
        /// Tenant number, 1-based
        tenant: u32,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },
    /// Show pairing tokens from recent gateway logs
    Pairing {
        /// Tenant number, 1-based
        tenant: Option<u32>,
    },
    /// Create tenant directories, config, credentials and proxy routes
    Provision {
        /// Tenant number, 1-based
        tenant: Option<u32>,
    },
    /// List the public hostnames that need certificates
    Hosts {
        /// Print a certbot invocation covering every hostname
        #[arg(long)]
        certbot: bool,
    },
    /// Check that host dependencies are installed
    Doctor,
    /// Check the fleet config for errors
    Validate,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
