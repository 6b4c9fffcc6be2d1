// src/services/portfolio.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Serialize;

use crate::config::{Config, PriceSource};
use crate::error::PortfolioError;
use crate::models::{
    AssetMetrics, BenchmarkBeta, BenchmarkMetrics, CorrelationMatrix, PriceTable, ReturnTable,
};
use crate::services::calculations::{
    annualized_total_return_pct, annualized_volatility, calculate_beta, calculate_correlation,
    calculate_covariance, correlation_matrix, drawdown_series, rolling_max_last,
    rolling_mean_last, sharpe_ratio, total_return, tracking_error, trailing,
    volatility_difference, weighted_returns, DAYS_PER_YEAR,
};
use crate::services::{csv_prices, reference, yahoo};

pub const PORTFOLIO_LABEL: &str = "Portfolio";

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub assets: Vec<AssetMetrics>,
    pub benchmarks: Vec<BenchmarkMetrics>,
    pub return_correlation: CorrelationMatrix,
    pub reference_correlation: CorrelationMatrix,
}

/// Load prices from the configured source, then analyze them.
pub async fn run(config: &Config) -> Result<PortfolioReport> {
    let prices = match &config.source {
        PriceSource::Yahoo => yahoo::fetch_prices(config).await?,
        PriceSource::Csv(path) => csv_prices::load_price_file(path)?,
    };
    analyze(&prices, config)
}

/// The whole forward pass over an already loaded price table.
pub fn analyze(prices: &PriceTable, config: &Config) -> Result<PortfolioReport> {
    if prices.len() < 2 {
        return Err(PortfolioError::insufficient_history(2, prices.len()).into());
    }

    let returns = prices.returns();
    info!(
        "Computing metrics over {} returns ({} to {})",
        returns.len(),
        prices.dates()[0],
        prices.dates()[prices.len() - 1]
    );

    let assets = asset_metrics(prices, &returns, config).context("Failed to build asset table")?;
    info!("Asset table built for {} tickers", assets.len());

    let portfolio = portfolio_returns(&returns, &config.tickers)?;
    let benchmarks = benchmark_metrics(&portfolio, &returns, config)
        .context("Failed to build benchmark table")?;
    info!("Benchmark table built for {} ETFs", benchmarks.len());

    let return_correlation = return_correlation(&returns, &portfolio, config.benchmark_window);
    let reference_correlation = reference::reference_correlation();

    Ok(PortfolioReport {
        first_date: prices.dates()[0],
        last_date: prices.dates()[prices.len() - 1],
        assets,
        benchmarks,
        return_correlation,
        reference_correlation,
    })
}

pub fn asset_metrics(
    prices: &PriceTable,
    returns: &ReturnTable,
    config: &Config,
) -> Result<Vec<AssetMetrics>, PortfolioError> {
    if prices.len() < 2 {
        return Err(PortfolioError::insufficient_history(2, prices.len()));
    }
    let weight_pct = 100.0 / config.tickers.len() as f64;

    let end = prices.len() - 1;
    let start = end.saturating_sub(config.return_lookback);
    let years = (prices.dates()[end] - prices.dates()[start]).num_days() as f64 / DAYS_PER_YEAR;
    debug!(
        "Total return measured from {} to {} ({:.3} years)",
        prices.dates()[start],
        prices.dates()[end],
        years
    );

    config
        .tickers
        .iter()
        .map(|ticker| -> Result<AssetMetrics, PortfolioError> {
            let price = prices.column(ticker)?;
            let ret = returns.column(ticker)?;

            let betas = config
                .benchmarks
                .iter()
                .map(|etf| -> Result<BenchmarkBeta, PortfolioError> {
                    Ok(BenchmarkBeta {
                        benchmark: etf.clone(),
                        beta: calculate_beta(ret, returns.column(etf)?, config.beta_window),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let drawdowns = drawdown_series(price);

            Ok(AssetMetrics {
                ticker: ticker.clone(),
                weight_pct,
                annualized_volatility: annualized_volatility(ret, config.volatility_window),
                betas,
                average_weekly_drawdown: rolling_mean_last(&drawdowns, config.drawdown_window),
                maximum_weekly_drawdown: rolling_max_last(&drawdowns, config.drawdown_window),
                total_return: total_return(price[start], price[end]),
                annualized_total_return_pct: annualized_total_return_pct(
                    price[start],
                    price[end],
                    years,
                ),
            })
        })
        .collect()
}

/// Equal-weighted sum of the equity returns, one value per return date.
pub fn portfolio_returns(returns: &ReturnTable, tickers: &[String]) -> Result<Vec<f64>, PortfolioError> {
    let series = tickers
        .iter()
        .map(|t| returns.column(t))
        .collect::<Result<Vec<_>, _>>()?;
    let weights = vec![1.0 / tickers.len() as f64; tickers.len()];
    Ok(weighted_returns(&series, &weights))
}

pub fn benchmark_metrics(
    portfolio: &[f64],
    returns: &ReturnTable,
    config: &Config,
) -> Result<Vec<BenchmarkMetrics>, PortfolioError> {
    let p = trailing(portfolio, config.benchmark_window);

    config
        .benchmarks
        .iter()
        .map(|etf| -> Result<BenchmarkMetrics, PortfolioError> {
            let b = trailing(returns.column(etf)?, config.benchmark_window);
            Ok(BenchmarkMetrics {
                benchmark: etf.clone(),
                correlation: calculate_correlation(p, b),
                covariance: calculate_covariance(p, b),
                tracking_error: tracking_error(p, b),
                sharpe_ratio: sharpe_ratio(p, b),
                volatility_difference: volatility_difference(p, b),
            })
        })
        .collect()
}

/// Correlation of every return column plus the synthetic portfolio over the
/// trailing window.
pub fn return_correlation(returns: &ReturnTable, portfolio: &[f64], window: usize) -> CorrelationMatrix {
    let mut labels: Vec<String> = returns.tickers().to_vec();
    labels.push(PORTFOLIO_LABEL.to_string());

    let mut columns: Vec<&[f64]> = returns
        .tickers()
        .iter()
        .filter_map(|t| returns.column(t).ok())
        .map(|c| trailing(c, window))
        .collect();
    columns.push(trailing(portfolio, window));

    correlation_matrix(labels, &columns)
}
