use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dealbot::config::{AppConfig, LoggingConfig, MetricsConfig, SmtpConfig};
use dealbot::scheduler::DealScheduler;
use dealbot::secrets::EnvSecrets;
use dealbot::DealBot;

#[derive(Debug, Parser)]
#[command(name = "dealbot", version, about = "Polls deal APIs and emails a digest of what it finds")]
struct Cli {
    /// Config file to load, extension optional
    #[arg(short, long, env = "DEALBOT_CONFIG", default_value = "config")]
    config: String,

    /// Run a single search and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    let _guard = init_tracing(&config.logging)?;
    init_metrics(&config.metrics)?;

    info!("Starting deal scraper...");

    let smtp = SmtpConfig::from_secrets(&EnvSecrets)?;
    let config = Arc::new(config);
    let bot = Arc::new(DealBot::from_config(
        Arc::clone(&config),
        Arc::new(EnvSecrets),
        smtp,
    )?);

    if cli.once || config.scheduler.run_on_start {
        bot.tick().await;
    }
    if cli.once {
        return Ok(());
    }

    let mut scheduler = DealScheduler::new(Arc::clone(&bot), config.scheduler.clone()).await?;
    scheduler.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    scheduler.shutdown().await?;

    Ok(())
}

/// Console output plus a plain-text log file. The returned guard flushes the
/// file writer and must live until exit.
fn init_tracing(logging: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(&logging.directory, &logging.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("dealbot=info".parse()?))
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    Ok(guard)
}

fn init_metrics(metrics: &MetricsConfig) -> Result<()> {
    if !metrics.enabled {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], metrics.port))
        .install()?;
    info!("Prometheus metrics exposed on port {}", metrics.port);
    Ok(())
}
