// src/services/calculations.rs
//
// Pure arithmetic over return and price series. Sample statistics use the
// n - 1 denominator. Missing data is NaN and is left to propagate.

use crate::models::CorrelationMatrix;

pub const TRADING_DAYS_PER_YEAR: usize = 252;
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Day-over-day percentage change; the output is one element shorter.
pub fn pct_change(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// The last `window` values, or all of them when the series is shorter.
pub fn trailing(values: &[f64], window: usize) -> &[f64] {
    &values[values.len().saturating_sub(window)..]
}

pub fn calculate_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn calculate_covariance(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return f64::NAN;
    }
    let mean_a = calculate_mean(a);
    let mean_b = calculate_mean(b);
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    sum / (a.len() - 1) as f64
}

pub fn calculate_variance(values: &[f64]) -> f64 {
    calculate_covariance(values, values)
}

pub fn calculate_std(values: &[f64]) -> f64 {
    calculate_variance(values).sqrt()
}

/// Pearson correlation.
pub fn calculate_correlation(a: &[f64], b: &[f64]) -> f64 {
    calculate_covariance(a, b) / (calculate_std(a) * calculate_std(b))
}

/// Pearson correlation over the positions where both series have a value.
pub fn pairwise_correlation(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    calculate_correlation(&xs, &ys)
}

/// Trailing-window standard deviation scaled by sqrt(252).
pub fn annualized_volatility(returns: &[f64], window: usize) -> f64 {
    calculate_std(trailing(returns, window)) * (TRADING_DAYS_PER_YEAR as f64).sqrt()
}

/// Beta = Cov(asset, benchmark) / Var(benchmark) over the trailing window.
pub fn calculate_beta(asset: &[f64], benchmark: &[f64], window: usize) -> f64 {
    let asset = trailing(asset, window);
    let benchmark = trailing(benchmark, window);
    calculate_covariance(asset, benchmark) / calculate_variance(benchmark)
}

/// Decline from the running peak as a non-negative fraction of that peak.
pub fn drawdown_series(prices: &[f64]) -> Vec<f64> {
    let mut peak = f64::NAN;
    prices
        .iter()
        .map(|&price| {
            peak = peak.max(price);
            (peak - price) / peak
        })
        .collect()
}

/// Mean of the last `window` values; NaN when the window is not full. A NaN
/// inside the window carries through the sum.
pub fn rolling_mean_last(values: &[f64], window: usize) -> f64 {
    if window == 0 || values.len() < window {
        return f64::NAN;
    }
    calculate_mean(trailing(values, window))
}

/// Max of the last `window` values; NaN unless the window is full and clean.
pub fn rolling_max_last(values: &[f64], window: usize) -> f64 {
    if window == 0 || values.len() < window {
        return f64::NAN;
    }
    let window = trailing(values, window);
    if window.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    window.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// (end - start) / start
pub fn total_return(start_price: f64, end_price: f64) -> f64 {
    (end_price - start_price) / start_price
}

/// [(end / start)^(1 / years) - 1] * 100
pub fn annualized_total_return_pct(start_price: f64, end_price: f64, years: f64) -> f64 {
    if years <= 0.0 {
        return f64::NAN;
    }
    ((end_price / start_price).powf(1.0 / years) - 1.0) * 100.0
}

/// Per-row weighted sum of several return series.
pub fn weighted_returns(series: &[&[f64]], weights: &[f64]) -> Vec<f64> {
    let rows = series.iter().map(|s| s.len()).min().unwrap_or(0);
    (0..rows)
        .map(|i| series.iter().zip(weights).map(|(s, w)| s[i] * w).sum())
        .collect()
}

/// Standard deviation of (portfolio - benchmark).
pub fn tracking_error(portfolio: &[f64], benchmark: &[f64]) -> f64 {
    let diff: Vec<f64> = portfolio.iter().zip(benchmark).map(|(p, b)| p - b).collect();
    calculate_std(&diff)
}

/// (mean(portfolio) - mean(benchmark)) / std(portfolio), the benchmark
/// standing in for the risk-free rate.
pub fn sharpe_ratio(portfolio: &[f64], benchmark: &[f64]) -> f64 {
    (calculate_mean(portfolio) - calculate_mean(benchmark)) / calculate_std(portfolio)
}

pub fn volatility_difference(portfolio: &[f64], benchmark: &[f64]) -> f64 {
    annualized_volatility(portfolio, portfolio.len())
        - annualized_volatility(benchmark, benchmark.len())
}

pub fn correlation_matrix(labels: Vec<String>, columns: &[&[f64]]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| calculate_correlation(a, b)).collect())
        .collect();
    CorrelationMatrix { labels, values }
}
