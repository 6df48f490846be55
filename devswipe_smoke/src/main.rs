use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use devswipe_client::{telemetry, ApiClient, ClientConfig};

mod steps;

#[derive(Parser)]
#[command(author, version, about = "End-to-end smoke test against a running DevSwipe backend")]
struct Args {
    /// API base URL including the version prefix. Defaults to DEVSWIPE_API_URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Per-request timeout. Defaults to DEVSWIPE_TIMEOUT_SECS.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }

    let client = ApiClient::new(&config).context("failed to build API client")?;
    tracing::info!(base_url = client.base_url(), "starting smoke run");

    let report = steps::run_all(&client).await;
    println!("{}", report.summary());

    if report.failed() > 0 {
        bail!("{} of {} smoke steps failed", report.failed(), report.total());
    }
    Ok(())
}
