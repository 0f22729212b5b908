use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

mod config;
mod helpers;
mod integrations;
mod jobs;
mod storage;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetches donation order confirmations from Gmail and exports them as CSV", long_about = None)]
struct Args {
    /// Config file path (defaults to the user config directory)
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Override the Gmail search query from the config file
    #[arg(long)]
    query: Option<String>,

    /// Override the directory raw .eml files are archived into
    #[arg(long)]
    archive_dir: Option<PathBuf>,

    /// Override the CSV export path
    #[arg(long)]
    export_path: Option<PathBuf>,

    #[arg(long)]
    log_file_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = &args.log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("ajyal.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let (mut config, config_path) = match args.config_path {
        Some(path) => config::CliConfig::load_from(path),
        None => config::CliConfig::load(),
    }
    .context("load configuration")?;
    tracing::info!("Loaded configuration from {:?}", config_path);

    if let Some(query) = args.query {
        config.fetch.query = query;
    }
    if let Some(archive_dir) = args.archive_dir {
        config.output.archive_dir = archive_dir;
    }
    if let Some(export_path) = args.export_path {
        config.output.export_path = export_path;
    }

    let report = jobs::export_run::run(&config).await?;

    println!(
        "Listed {} messages, fetched {}, exported {} rows ({} without order data, {} fetch failures)",
        report.listed,
        report.fetched,
        report.extracted,
        report.skipped_extraction,
        report.failed_fetch
    );

    Ok(())
}
