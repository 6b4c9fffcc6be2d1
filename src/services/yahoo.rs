// src/services/yahoo.rs
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::PortfolioError;
use crate::models::PriceTable;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

/// Download adjusted closes for every configured symbol and join them on date.
pub async fn fetch_prices(config: &Config) -> Result<PriceTable> {
    let client = Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()?;

    let mut series = Vec::new();
    for symbol in config.all_symbols() {
        let points = fetch_adjusted_closes(&client, &symbol, config.start_date, config.end_date)
            .await
            .with_context(|| format!("Failed to fetch prices for {}", symbol))?;
        series.push((symbol, points));
    }

    let table = PriceTable::from_series(series)?;
    info!(
        "Price table assembled: {} dates x {} tickers",
        table.len(),
        table.tickers().len()
    );
    Ok(table)
}

pub async fn fetch_adjusted_closes(
    client: &Client,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, f64)>> {
    let url = chart_url(symbol, start, end);
    info!("Fetching Yahoo chart from URL: {}", url);

    let resp = client.get(&url).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    debug!("{} responded {} ({} bytes)", symbol, status, body.len());

    let points = parse_chart(symbol, &body)
        .with_context(|| format!("Unexpected chart response (HTTP {})", status))?;
    info!("Fetched {} daily prices for {}", points.len(), symbol);
    Ok(points)
}

fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{base}/{symbol}?period1={p1}&period2={p2}&interval=1d&events=div%7Csplit&includeAdjustedClose=true",
        base = CHART_URL,
        symbol = symbol,
        p1 = unix_midnight(start),
        p2 = unix_midnight(end),
    )
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Decode a v8 chart body into (trading date, adjusted close) pairs. A null
/// price stays in the series as NaN.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<(NaiveDate, f64)>> {
    let response: ChartResponse =
        serde_json::from_str(body).context("Failed to parse chart JSON")?;

    if let Some(err) = response.chart.error {
        return Err(PortfolioError::provider(symbol, format!("{} - {}", err.code, err.description)).into());
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| PortfolioError::provider(symbol, "empty result"))?;

    let timestamps = data.timestamp.unwrap_or_default();
    if timestamps.is_empty() {
        return Err(PortfolioError::provider(symbol, "no price rows").into());
    }
    let closes = match data.indicators.adjclose.and_then(|a| a.into_iter().next()) {
        Some(adj) => adj.adjclose,
        None => {
            warn!("No adjusted closes for {}, using raw closes", symbol);
            data.indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .unwrap_or_default()
        }
    };

    if closes.len() != timestamps.len() {
        return Err(PortfolioError::provider(
            symbol,
            format!("{} timestamps but {} prices", timestamps.len(), closes.len()),
        )
        .into());
    }

    timestamps
        .iter()
        .zip(closes)
        .map(|(&ts, close)| -> Result<(NaiveDate, f64)> {
            let date = trading_date(ts)
                .ok_or_else(|| PortfolioError::provider(symbol, format!("bad timestamp {}", ts)))?;
            Ok((date, close.unwrap_or(f64::NAN)))
        })
        .collect()
}

/// Exchange-local calendar date of a provider timestamp.
fn trading_date(ts: i64) -> Option<NaiveDate> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|t| t.with_timezone(&New_York).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"chart":{"result":[{"meta":{"symbol":"SPY"},
        "timestamp":[1668781800,1669041000,1669127400],
        "indicators":{"quote":[{"close":[396.0,394.6,null]}],
        "adjclose":[{"adjclose":[380.1,378.9,null]}]}}],"error":null}}"#;

    #[test]
    fn test_parse_chart_uses_adjusted_close() {
        let points = parse_chart("SPY", BODY).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], (NaiveDate::from_ymd_opt(2022, 11, 18).unwrap(), 380.1));
        assert_eq!(points[1].0, NaiveDate::from_ymd_opt(2022, 11, 21).unwrap());
        assert!(points[2].1.is_nan());
    }

    #[test]
    fn test_parse_chart_falls_back_to_close() {
        let body = r#"{"chart":{"result":[{"timestamp":[1668781800],
            "indicators":{"quote":[{"close":[396.0]}]}}],"error":null}}"#;
        let points = parse_chart("SPY", body).unwrap();
        assert_eq!(points[0].1, 396.0);
    }

    #[test]
    fn test_parse_chart_reports_provider_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("XXXX", body).unwrap_err();
        let err = err.downcast::<PortfolioError>().unwrap();
        assert!(err.message.contains("XXXX"));
        assert!(err.message.contains("delisted"));
    }

    #[test]
    fn test_parse_chart_rejects_result_without_rows() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}],
            "adjclose":[{"adjclose":[]}]}}],"error":null}}"#;
        let err = parse_chart("NVDA", body).unwrap_err();
        let err = err.downcast::<PortfolioError>().unwrap();
        assert_eq!(err, PortfolioError::provider("NVDA", "no price rows"));
    }

    #[test]
    fn test_parse_chart_rejects_garbage() {
        assert!(parse_chart("SPY", "<html>").is_err());
    }

    #[test]
    fn test_chart_url_range() {
        let url = chart_url(
            "NVDA",
            NaiveDate::from_ymd_opt(2012, 11, 23).unwrap(),
            NaiveDate::from_ymd_opt(2022, 11, 23).unwrap(),
        );
        assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/NVDA?"));
        assert!(url.contains("period1=1353628800"));
        assert!(url.contains("period2=1669161600"));
        assert!(url.contains("interval=1d"));
    }
}
