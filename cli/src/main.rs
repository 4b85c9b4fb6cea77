// Command-line entry point for migrating between API Management services

use anyhow::Context;
use apim_migrator::migration::{run_migration, RunOptions, TracingProgressReporter};
use apim_migrator::MigratorConfig;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser)]
#[command(name = "apim-migrate")]
#[command(
    about = "Copy users, group memberships and subscriptions between Azure API Management services",
    long_about = None
)]
struct Cli {
    /// Delete destination users (and their subscriptions) before migrating
    #[arg(long)]
    cleanup: bool,

    /// Read and filter the source, log what would be written, write nothing
    #[arg(long)]
    dry_run: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Enable verbose logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the process environment still applies
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_format, cli.verbose);

    let mut config = MigratorConfig::from_env();
    if cli.cleanup {
        config.cleanup_enabled = true;
    }
    tracing::debug!("Loaded configuration: {:?}", config);

    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    let report = run_migration(&config, options, &TracingProgressReporter)
        .await
        .with_context(|| {
            format!(
                "migration from {} to {} failed",
                config.source.service_name, config.destination.service_name
            )
        })?;

    for phase in &report.phases {
        println!(
            "{:<14} fetched {:>5}  excluded {:>5}  skipped {:>5}  written {:>5}",
            phase.phase, phase.fetched, phase.excluded, phase.skipped, phase.written
        );
    }
    Ok(())
}
