// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::PortfolioError;
use crate::services::calculations::pct_change;

/// Adjusted-close prices, one column per ticker, rows in ascending date order.
/// Missing observations are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl PriceTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, PortfolioError> {
        validate_shape(&dates, &tickers, &columns)?;
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PortfolioError::new("price dates must be strictly ascending"));
        }
        Ok(PriceTable { dates, tickers, columns })
    }

    /// Outer-join per-ticker (date, price) series on date. A ticker without
    /// a price on a joined date gets NaN.
    pub fn from_series(series: Vec<(String, Vec<(NaiveDate, f64)>)>) -> Result<Self, PortfolioError> {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(d, _)| *d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut tickers = Vec::with_capacity(series.len());
        let mut columns = Vec::with_capacity(series.len());
        for (symbol, points) in series {
            let by_date: BTreeMap<NaiveDate, f64> = points.into_iter().collect();
            columns.push(
                dates
                    .iter()
                    .map(|d| by_date.get(d).copied().unwrap_or(f64::NAN))
                    .collect(),
            );
            tickers.push(symbol);
        }

        PriceTable::new(dates, tickers, columns)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Result<&[f64], PortfolioError> {
        column_of(&self.tickers, &self.columns, symbol)
    }

    /// Day-over-day percentage change. The first price row has no prior day,
    /// so the return table starts at the second date.
    pub fn returns(&self) -> ReturnTable {
        ReturnTable {
            dates: self.dates.iter().skip(1).copied().collect(),
            tickers: self.tickers.clone(),
            columns: self.columns.iter().map(|c| pct_change(c)).collect(),
        }
    }
}

/// Daily percentage returns, same tickers as the price table it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl ReturnTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, PortfolioError> {
        validate_shape(&dates, &tickers, &columns)?;
        Ok(ReturnTable { dates, tickers, columns })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Result<&[f64], PortfolioError> {
        column_of(&self.tickers, &self.columns, symbol)
    }
}

fn validate_shape(
    dates: &[NaiveDate],
    tickers: &[String],
    columns: &[Vec<f64>],
) -> Result<(), PortfolioError> {
    if tickers.len() != columns.len() {
        return Err(PortfolioError::new(format!(
            "{} tickers but {} columns",
            tickers.len(),
            columns.len()
        )));
    }
    if let Some((symbol, column)) = tickers
        .iter()
        .zip(columns)
        .find(|(_, c)| c.len() != dates.len())
    {
        return Err(PortfolioError::new(format!(
            "column {} has {} rows, expected {}",
            symbol,
            column.len(),
            dates.len()
        )));
    }
    Ok(())
}

fn column_of<'a>(
    tickers: &[String],
    columns: &'a [Vec<f64>],
    symbol: &str,
) -> Result<&'a [f64], PortfolioError> {
    tickers
        .iter()
        .position(|t| t == symbol)
        .map(|i| columns[i].as_slice())
        .ok_or_else(|| PortfolioError::unknown_ticker(symbol))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkBeta {
    pub benchmark: String,
    pub beta: f64,
}

/// One row of the asset table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetrics {
    pub ticker: String,
    pub weight_pct: f64,
    pub annualized_volatility: f64,
    pub betas: Vec<BenchmarkBeta>,
    pub average_weekly_drawdown: f64,
    pub maximum_weekly_drawdown: f64,
    pub total_return: f64,
    pub annualized_total_return_pct: f64,
}

impl AssetMetrics {
    pub fn beta_against(&self, benchmark: &str) -> Option<f64> {
        self.betas
            .iter()
            .find(|b| b.benchmark == benchmark)
            .map(|b| b.beta)
    }
}

/// One row of the benchmark table: the synthetic portfolio against one ETF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub benchmark: String,
    pub correlation: f64,
    pub covariance: f64,
    pub tracking_error: f64,
    pub sharpe_ratio: f64,
    pub volatility_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == col)?;
        Some(self.values[i][j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 11, d).unwrap()
    }

    #[test]
    fn test_returns_drop_first_row() {
        let prices = PriceTable::new(
            vec![date(1), date(2), date(3)],
            vec!["AAA".to_string()],
            vec![vec![100.0, 110.0, 99.0]],
        )
        .unwrap();
        let returns = prices.returns();
        assert_eq!(returns.dates(), &[date(2), date(3)]);
        let col = returns.column("AAA").unwrap();
        assert!((col[0] - 0.10).abs() < 1e-12);
        assert!((col[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_from_series_outer_joins_dates() {
        let prices = PriceTable::from_series(vec![
            ("AAA".to_string(), vec![(date(1), 1.0), (date(3), 3.0)]),
            ("BBB".to_string(), vec![(date(2), 20.0), (date(3), 30.0)]),
        ])
        .unwrap();
        assert_eq!(prices.dates(), &[date(1), date(2), date(3)]);
        let a = prices.column("AAA").unwrap();
        assert_eq!(a[0], 1.0);
        assert!(a[1].is_nan());
        assert_eq!(prices.column("BBB").unwrap()[2], 30.0);
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let err = PriceTable::new(
            vec![date(1), date(2)],
            vec!["AAA".to_string()],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(err.message.contains("AAA"));
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        assert!(PriceTable::new(
            vec![date(2), date(1)],
            vec!["AAA".to_string()],
            vec![vec![1.0, 2.0]],
        )
        .is_err());
    }

    #[test]
    fn test_unknown_ticker() {
        let prices = PriceTable::new(vec![date(1)], vec!["AAA".to_string()], vec![vec![1.0]]).unwrap();
        assert_eq!(
            prices.column("ZZZ").unwrap_err(),
            PortfolioError::unknown_ticker("ZZZ")
        );
    }

    #[test]
    fn test_correlation_lookup() {
        let m = CorrelationMatrix {
            labels: vec!["A".to_string(), "B".to_string()],
            values: vec![vec![1.0, 0.5], vec![0.5, 1.0]],
        };
        assert_eq!(m.get("A", "B"), Some(0.5));
        assert_eq!(m.get("A", "C"), None);
    }
}
