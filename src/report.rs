// src/report.rs
use anyhow::Result;
use std::io::Write;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

use crate::config::OutputFormat;
use crate::models::{BenchmarkMetrics, CorrelationMatrix};
use crate::services::portfolio::PortfolioReport;

pub fn write_report<W: Write>(report: &PortfolioReport, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Table => out.write_all(render_text(report).as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn render_text(report: &PortfolioReport) -> String {
    let sections = [
        format!("Prices from {} to {}", report.first_date, report.last_date),
        asset_table(report).to_string(),
        Table::new(report.benchmarks.iter().map(BenchmarkRow::from)).to_string(),
        format!(
            "Return correlation (trailing window)\n{}",
            matrix_table(&report.return_correlation)
        ),
        format!(
            "Reference snapshot correlation\n{}",
            matrix_table(&report.reference_correlation)
        ),
    ];
    let mut text = sections.join("\n\n");
    text.push('\n');
    text
}

#[derive(Tabled)]
struct BenchmarkRow {
    #[tabled(rename = "ETF")]
    benchmark: String,
    #[tabled(rename = "Correlation", display_with = "cell")]
    correlation: f64,
    #[tabled(rename = "Covariance", display_with = "cell")]
    covariance: f64,
    #[tabled(rename = "Tracking Err", display_with = "cell")]
    tracking_error: f64,
    #[tabled(rename = "Sharpe", display_with = "cell")]
    sharpe_ratio: f64,
    #[tabled(rename = "Vol Diff", display_with = "cell")]
    volatility_difference: f64,
}

impl From<&BenchmarkMetrics> for BenchmarkRow {
    fn from(m: &BenchmarkMetrics) -> Self {
        BenchmarkRow {
            benchmark: m.benchmark.clone(),
            correlation: m.correlation,
            covariance: m.covariance,
            tracking_error: m.tracking_error,
            sharpe_ratio: m.sharpe_ratio,
            volatility_difference: m.volatility_difference,
        }
    }
}

fn cell(value: &f64) -> String {
    format!("{:.6}", value)
}

// One beta column per benchmark, so the header is built at runtime.
fn asset_table(report: &PortfolioReport) -> Table {
    let mut builder = Builder::default();

    let mut header = vec!["Asset".to_string(), "Weight (%)".to_string(), "Ann. Vol".to_string()];
    if let Some(first) = report.assets.first() {
        header.extend(first.betas.iter().map(|b| format!("Beta {}", b.benchmark)));
    }
    header.extend(
        ["Avg Wk DD", "Max Wk DD", "Total Ret", "Ann. Ret (%)"]
            .iter()
            .map(|h| h.to_string()),
    );
    builder.push_record(header);

    for asset in &report.assets {
        let mut row = vec![
            asset.ticker.clone(),
            cell(&asset.weight_pct),
            cell(&asset.annualized_volatility),
        ];
        row.extend(asset.betas.iter().map(|b| cell(&b.beta)));
        row.extend(
            [
                asset.average_weekly_drawdown,
                asset.maximum_weekly_drawdown,
                asset.total_return,
                asset.annualized_total_return_pct,
            ]
            .iter()
            .map(cell),
        );
        builder.push_record(row);
    }

    builder.build()
}

fn matrix_table(matrix: &CorrelationMatrix) -> Table {
    let mut builder = Builder::default();

    let mut header = vec![String::new()];
    header.extend(matrix.labels.iter().cloned());
    builder.push_record(header);

    for (label, values) in matrix.labels.iter().zip(&matrix.values) {
        let mut row = vec![label.clone()];
        row.extend(values.iter().map(cell));
        builder.push_record(row);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetMetrics, BenchmarkBeta};
    use chrono::NaiveDate;

    fn report() -> PortfolioReport {
        PortfolioReport {
            first_date: NaiveDate::from_ymd_opt(2012, 11, 23).unwrap(),
            last_date: NaiveDate::from_ymd_opt(2022, 11, 22).unwrap(),
            assets: vec![AssetMetrics {
                ticker: "NVDA".to_string(),
                weight_pct: 100.0 / 7.0,
                annualized_volatility: 0.63,
                betas: vec![BenchmarkBeta {
                    benchmark: "SPY".to_string(),
                    beta: 2.2,
                }],
                average_weekly_drawdown: 0.4,
                maximum_weekly_drawdown: 0.45,
                total_return: f64::NAN,
                annualized_total_return_pct: 12.5,
            }],
            benchmarks: vec![BenchmarkMetrics {
                benchmark: "SPY".to_string(),
                correlation: 0.7,
                covariance: 0.0001,
                tracking_error: 0.008,
                sharpe_ratio: 0.03,
                volatility_difference: -0.02,
            }],
            return_correlation: CorrelationMatrix {
                labels: vec!["SPY".to_string(), "Portfolio".to_string()],
                values: vec![vec![1.0, 0.7], vec![0.7, 1.0]],
            },
            reference_correlation: CorrelationMatrix {
                labels: vec!["NVDA".to_string()],
                values: vec![vec![1.0]],
            },
        }
    }

    #[test]
    fn test_render_text_contains_tables() {
        let text = render_text(&report());
        assert!(text.starts_with("Prices from 2012-11-23 to 2022-11-22"));
        assert!(text.contains("Beta SPY"));
        assert!(text.contains("14.285714"));
        assert!(text.contains("NaN"));
        assert!(text.contains("Tracking Err"));
        assert!(text.contains("Reference snapshot correlation"));
    }

    #[test]
    fn test_tables_have_one_line_per_row() {
        let text = render_text(&report());
        let nvda_rows = text.lines().filter(|l| l.contains("NVDA")).count();
        // asset row, plus header and row of the reference matrix
        assert_eq!(nvda_rows, 3);
        let spy_row = text
            .lines()
            .find(|l| l.contains("SPY") && l.contains("0.008000"))
            .unwrap();
        assert!(spy_row.contains("0.700000"));
        assert!(spy_row.contains("-0.020000"));
    }

    #[test]
    fn test_json_output() {
        let mut out = Vec::new();
        write_report(&report(), OutputFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["assets"][0]["ticker"], "NVDA");
        assert_eq!(value["benchmarks"][0]["benchmark"], "SPY");
        assert!(value["assets"][0]["total_return"].is_null());
    }
}
