use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_updater::{
    config::{defaults::DEFAULT_CONFIG_FILE, Config, Credentials},
    pipeline::EpgUpdatePipeline,
    sources::HttpFeedFetcher,
    utils::url::UrlUtils,
};

#[derive(Parser)]
#[command(name = "epg-updater")]
#[command(version)]
#[command(about = "Fetches an XMLTV feed and merges it into a persisted, curated EPG")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Snapshot path (overrides config file)
    #[arg(short, long, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Run the full update without writing the snapshot
    #[arg(long)]
    dry_run: bool,

    /// Print the built-in configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter = format!("epg_updater={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("EPG update failed: {:#}", e);
            eprintln!("epg-updater: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.print_default_config {
        print!("{}", Config::default().to_toml()?);
        return Ok(());
    }

    info!("Starting EPG updater v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(Some(&cli.config)).context("Failed to load configuration")?;
    if let Some(snapshot) = cli.snapshot {
        config.storage.snapshot_path = snapshot;
    }

    // Credentials are checked before anything touches the network
    let credentials = Credentials::from_env(&config.provider)?;

    let fetcher = HttpFeedFetcher::new(
        config.provider.connect_timeout,
        &config.provider.user_agent,
    )?;
    let pipeline = EpgUpdatePipeline::from_config(&config, &credentials, Box::new(fetcher))?;

    info!(
        "Provider: {}, snapshot: {}, retention: {}",
        UrlUtils::obfuscate_credentials(&config.provider.resolve_url(&credentials)),
        config.storage.snapshot_path.display(),
        config.retention.describe()
    );

    let summary = pipeline.run(Utc::now(), cli.dry_run).await?;
    if cli.dry_run {
        info!("Dry run complete: {}", summary);
    }
    Ok(())
}
