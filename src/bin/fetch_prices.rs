// src/bin/fetch_prices.rs
//
// Downloads the configured price table and prints it as CSV, in the layout
// PORTFOLIO_PRICES_CSV reads back.
use dotenv::dotenv;
use log::{error, info};
use std::io;

use portfolio_stats::services::{csv_prices::write_price_csv, yahoo::fetch_prices};
use portfolio_stats::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    info!("Fetching {} symbols from Yahoo Finance...", config.all_symbols().len());

    match fetch_prices(&config).await {
        Ok(table) => {
            write_price_csv(&table, io::stdout().lock())?;
            info!("SUCCESS: wrote {} rows", table.len());
        }
        Err(e) => {
            error!("ERROR: Failed to fetch prices: {:#}", e);
            return Err(e);
        }
    }

    Ok(())
}
