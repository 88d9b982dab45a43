use clap::Parser;
use freightpay::config::{Config, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use otm::{OtmClient, OtmConfig};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "freightpay", about = "FreightPay shipment investigation API")]
struct Cli {
    /// Path to the service config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;

    if let Some(metrics_config) = &config.metrics {
        install_statsd_recorder(metrics_config)?;
    }

    let otm = OtmClient::new(OtmConfig::from_env())?;

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        "starting freightpay investigator api"
    );
    freightpay::api::serve(config.listener.clone(), otm).await?;
    Ok(())
}

fn install_statsd_recorder(config: &MetricsConfig) -> Result<(), Box<dyn Error>> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .with_queue_size(5000)
        .with_buffer_size(1024)
        .build(Some("freightpay"))?;
    metrics::set_global_recorder(recorder).map_err(|e| e.to_string())?;
    Ok(())
}
