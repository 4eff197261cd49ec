use clap::{CommandFactory, Parser};
use clap_complete::aot::generate;
use tenantctl::cli::{Cli, Commands};
use tenantctl::commands;
use tenantctl::supervisor::Verb;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so table and JSON output stay clean on stdout.
    let default_level = match cli.global.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_file = cli.global.config_file.as_deref();

    let result = match &cli.command {
        Commands::Start { tenant } => commands::lifecycle::run(config_file, Verb::Start, *tenant).await,
        Commands::Stop { tenant } => commands::lifecycle::run(config_file, Verb::Stop, *tenant).await,
        Commands::Restart { tenant } => {
            commands::lifecycle::run(config_file, Verb::Restart, *tenant).await
        }
        Commands::Enable { tenant } => {
            commands::lifecycle::run(config_file, Verb::Enable, *tenant).await
        }
        Commands::Disable { tenant } => {
            commands::lifecycle::run(config_file, Verb::Disable, *tenant).await
        }
        Commands::Status { tenant, format } => {
            commands::status::run(config_file, *tenant, *format).await
        }
        Commands::Logs {
            tenant,
            lines,
            no_follow,
        } => commands::logs::run(config_file, *tenant, *lines, !*no_follow).await,
        Commands::Password { tenant, stdin } => {
            commands::password::run(config_file, *tenant, *stdin).await
        }
        Commands::Pairing { tenant } => commands::pairing::run(config_file, *tenant).await,
        Commands::Provision { tenant } => commands::provision::run(config_file, *tenant).await,
        Commands::Hosts { certbot } => commands::hosts::run(config_file, *certbot),
        Commands::Doctor => commands::doctor::run(config_file),
        Commands::Validate => commands::validate::run(config_file),
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "tenantctl", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
