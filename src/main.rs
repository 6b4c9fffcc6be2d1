use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::io;

use portfolio_stats::{report, run, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting portfolio analysis...");

    let config = Config::from_env();
    info!(
        "Tickers: {:?}, benchmarks: {:?}, {} to {}",
        config.tickers, config.benchmarks, config.start_date, config.end_date
    );

    let report = run(&config).await?;
    report::write_report(&report, config.output, io::stdout().lock())?;

    info!("Analysis complete");
    Ok(())
}
