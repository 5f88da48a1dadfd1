use clap::Parser;
use shared::metrics::Metrics;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(name = "waypoint", about = "Telemetry ingestion and positioning gateway")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::Config::from_file(&cli.config)?;
    config.ingest.validate()?;

    // Guard must stay alive for the lifetime of the process.
    let _sentry_guard = config
        .logging
        .as_ref()
        .and_then(|logging| logging.sentry_dsn.as_deref())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ))
        });

    let metrics = match &config.metrics {
        Some(m) => Metrics::new(&m.statsd_host, m.statsd_port, "waypoint")?,
        None => Metrics::new_noop(),
    };

    tracing::info!(config = %cli.config.display(), "starting waypoint gateway");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(ingest::run(config.ingest, metrics))?;

    Ok(())
}
