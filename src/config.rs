// src/config.rs
use chrono::NaiveDate;
use log::{info, warn};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TICKERS: [&str; 7] = ["NVDA", "TSLA", "GME", "AMD", "MSFT", "META", "WMT"];
pub const DEFAULT_BENCHMARKS: [&str; 3] = ["SPY", "IWM", "DIA"];
pub const DEFAULT_START_DATE: &str = "2012-11-23";
pub const DEFAULT_END_DATE: &str = "2022-11-23";

#[derive(Debug, Clone, PartialEq)]
pub enum PriceSource {
    Yahoo,
    Csv(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tickers: Vec<String>,
    pub benchmarks: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Returns used for annualized volatility (one quarter).
    pub volatility_window: usize,
    /// Returns used for beta (one year).
    pub beta_window: usize,
    /// Rows in the weekly drawdown window.
    pub drawdown_window: usize,
    /// Price rows between the start and end of the total-return measurement.
    pub return_lookback: usize,
    /// Returns used for the portfolio vs. benchmark comparison.
    pub benchmark_window: usize,
    pub source: PriceSource,
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            benchmarks: DEFAULT_BENCHMARKS.iter().map(|t| t.to_string()).collect(),
            start_date: parse_date(DEFAULT_START_DATE).unwrap_or_default(),
            end_date: parse_date(DEFAULT_END_DATE).unwrap_or_default(),
            volatility_window: 63,
            beta_window: 252,
            drawdown_window: 5,
            return_lookback: 252,
            benchmark_window: 252,
            source: PriceSource::Yahoo,
            output: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Defaults overridden by `PORTFOLIO_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        match lookup("PORTFOLIO_TICKERS").map(|v| parse_symbols(&v)) {
            Some(tickers) if !tickers.is_empty() => config.tickers = tickers,
            Some(_) => warn!("PORTFOLIO_TICKERS is empty, using defaults"),
            None => {}
        }

        match lookup("PORTFOLIO_BENCHMARKS").map(|v| parse_symbols(&v)) {
            Some(benchmarks) if !benchmarks.is_empty() => config.benchmarks = benchmarks,
            Some(_) => warn!("PORTFOLIO_BENCHMARKS is empty, using defaults"),
            None => {}
        }

        if let Some(raw) = lookup("PORTFOLIO_START_DATE") {
            match parse_date(&raw) {
                Some(date) => config.start_date = date,
                None => warn!("Invalid PORTFOLIO_START_DATE {:?}, defaulting to {}", raw, DEFAULT_START_DATE),
            }
        }

        if let Some(raw) = lookup("PORTFOLIO_END_DATE") {
            match parse_date(&raw) {
                Some(date) => config.end_date = date,
                None => warn!("Invalid PORTFOLIO_END_DATE {:?}, defaulting to {}", raw, DEFAULT_END_DATE),
            }
        }

        if let Some(path) = lookup("PORTFOLIO_PRICES_CSV").filter(|p| !p.trim().is_empty()) {
            info!("Reading prices from {}", path);
            config.source = PriceSource::Csv(PathBuf::from(path.trim()));
        }

        if let Some(raw) = lookup("PORTFOLIO_OUTPUT") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "json" => config.output = OutputFormat::Json,
                "table" => config.output = OutputFormat::Table,
                other => warn!("Unknown PORTFOLIO_OUTPUT {:?}, defaulting to table", other),
            }
        }

        config
    }

    /// Equities followed by benchmarks, the order prices are requested in.
    pub fn all_symbols(&self) -> Vec<String> {
        self.tickers
            .iter()
            .chain(self.benchmarks.iter())
            .cloned()
            .collect()
    }
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
