// src/services/reference.rs
//
// Manually recorded figures kept alongside the computed tables. They are not
// derived from the fetched prices and are only used for their own
// correlation matrix.

use crate::models::CorrelationMatrix;
use crate::services::calculations::pairwise_correlation;

/// Weight, volatility, three betas, two weekly drawdowns, total return and
/// annualized total return for each equity.
pub const ASSET_SNAPSHOT: [(&str, [f64; 9]); 7] = [
    ("NVDA", [0.07, 0.634418, 2.214848, 1.839605, 2.376997, 42.095012, 43.106507, 43.763331, 46.248776]),
    ("TSLA", [0.07, 0.557269, 1.780724, 1.539481, 1.788735, 313.493467, 329.974925, 19.997282, 35.586455]),
    ("GME", [0.07, 0.746471, 1.957305, 1.972465, 2.045533, 2.398628, 2.521421, 1.945622, 11.408341]),
    ("AMD", [0.07, 0.642289, 2.067816, 1.721387, 2.218046, 152.996285, 156.500007, 21.529941, 36.545064]),
    ("MSFT", [0.07, 0.400705, 1.259122, 0.916869, 1.393819, 1338.645560, 1353.504558, 6.677201, 22.608419]),
    ("META", [0.07, 0.716671, 1.702263, 1.337453, 1.773996, 251.827006, 255.505948, 1.410556, 9.197255]),
    ("WMT", [0.07, 0.246433, 0.428176, 0.265739, 0.570775, 316.223712, 319.981791, 1.320966, 8.784466]),
];

/// Correlation, covariance, tracking error, Sharpe ratio and volatility
/// difference for each benchmark.
pub const BENCHMARK_SNAPSHOT: [(&str, [f64; 5]); 3] = [
    ("SPY", [0.706765, 0.000077, 0.007969, 0.027550, -0.024024]),
    ("IWM", [0.668021, 0.000091, 0.010187, 0.034955, -0.068011]),
    ("DIA", [0.625429, 0.000069, 0.008936, 0.029568, -0.024560]),
];

/// Columns of both snapshots side by side. The benchmark columns are
/// shorter, so correlations against them only use the first five rows.
pub fn reference_correlation() -> CorrelationMatrix {
    let columns: Vec<(String, Vec<Option<f64>>)> = ASSET_SNAPSHOT
        .iter()
        .map(|(t, v)| (t.to_string(), v.iter().copied().map(Some).collect()))
        .chain(
            BENCHMARK_SNAPSHOT
                .iter()
                .map(|(t, v)| (t.to_string(), v.iter().copied().map(Some).collect())),
        )
        .collect();

    let rows = columns.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    let padded: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|(_, c)| {
            let mut c = c.clone();
            c.resize(rows, None);
            c
        })
        .collect();

    let values = padded
        .iter()
        .map(|a| padded.iter().map(|b| pairwise_correlation(a, b)).collect())
        .collect();

    CorrelationMatrix {
        labels: columns.into_iter().map(|(label, _)| label).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_matrix_shape_and_diagonal() {
        let m = reference_correlation();
        assert_eq!(m.labels.len(), 10);
        assert_eq!(m.labels[0], "NVDA");
        assert_eq!(m.labels[9], "DIA");
        for i in 0..10 {
            assert!((m.values[i][i] - 1.0).abs() < 1e-9, "diagonal {}", m.labels[i]);
        }
    }

    #[test]
    fn test_reference_matrix_is_symmetric() {
        let m = reference_correlation();
        for i in 0..10 {
            for j in 0..10 {
                assert!((m.values[i][j] - m.values[j][i]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_asset_vs_benchmark_uses_overlapping_rows() {
        let m = reference_correlation();
        let nvda: Vec<f64> = ASSET_SNAPSHOT[0].1[..5].to_vec();
        let spy: Vec<f64> = BENCHMARK_SNAPSHOT[0].1.to_vec();
        let expected = crate::services::calculations::calculate_correlation(&nvda, &spy);
        assert!((m.get("NVDA", "SPY").unwrap() - expected).abs() < 1e-12);
    }
}
