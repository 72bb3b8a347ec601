//! Correlation Engine
//!
//! Pairwise Pearson correlation of daily closes over the 7 / 30 / 90 day
//! windows, optionally weighted by `sqrt(volume_a * volume_b)`, with a
//! two-tailed significance test.
//!
//! The p-value comes from the regularized incomplete beta function
//! (`p = I_{df/(df+t^2)}(df/2, 1/2)`, `t = r * sqrt(df / (1 - r^2))`,
//! `df = n - 2`). It is accurate enough for bucketing and ranking.

use crate::constants::MIN_CORRELATION_DAYS;
use crate::indicators::{calculate_annualized_volatility, mean};
use crate::models::{CandleSeries, CorrelationRecord, Significance, Timeframe};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

/// One day both legs traded
#[derive(Debug, Clone, Copy)]
struct AlignedPoint {
    close_a: f64,
    close_b: f64,
    volume_a: f64,
    volume_b: f64,
}

/// Settings for one correlation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationSettings {
    /// Window (days) for the canonical `correlation`
    pub timeframe_days: usize,
    /// Minimum average daily USD volume for both legs
    pub min_volume_usd: f64,
    pub volume_weighted: bool,
}

/// Pearson correlation, optionally weighted.
///
/// Returns `None` for fewer than two points or mismatched lengths, and 0.0
/// when either side has no variance.
pub fn weighted_pearson(x: &[f64], y: &[f64], weights: Option<&[f64]>) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 || weights.map_or(false, |w| w.len() != x.len()) {
        return None;
    }

    let weight = |i: usize| weights.map_or(1.0, |w| w[i].max(0.0));
    let total: f64 = (0..x.len()).map(weight).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let mean_x = (0..x.len()).map(|i| weight(i) * x[i]).sum::<f64>() / total;
    let mean_y = (0..y.len()).map(|i| weight(i) * y[i]).sum::<f64>() / total;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..x.len() {
        let w = weight(i);
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        covariance += w * dx * dy;
        var_x += w * dx * dx;
        var_y += w * dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return Some(0.0);
    }
    Some((covariance / denominator).clamp(-1.0, 1.0))
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function (Lanczos approximation)
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // reflection formula
        return PI.ln() - (PI * x).sin().abs().ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, c)| acc + c / (x + i as f64));
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Continued fraction for the incomplete beta function (modified Lentz)
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 3e-14;
    const FLOOR: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < FLOOR { FLOOR } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    h
}

/// Regularized incomplete beta function I_x(a, b)
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Two-tailed p-value for Pearson `r` over `n` samples
///
/// # Returns
/// 1.0 when `n < 3` (nothing to test), 0.0 for a perfect correlation.
pub fn correlation_p_value(r: f64, n: usize) -> f64 {
    if n < 3 || !r.is_finite() {
        return 1.0;
    }
    let r2 = r * r;
    if r2 >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t2 = r2 * df / (1.0 - r2);
    regularized_incomplete_beta(df / 2.0, 0.5, df / (df + t2)).clamp(0.0, 1.0)
}

/// Join two series on common timestamps, oldest first
fn align(a: &CandleSeries, b: &CandleSeries) -> Vec<AlignedPoint> {
    let by_time: HashMap<i64, (f64, f64)> = b
        .candles()
        .iter()
        .map(|c| (c.timestamp, (c.close, c.volume)))
        .collect();

    a.candles()
        .iter()
        .filter_map(|c| {
            by_time.get(&c.timestamp).map(|&(close_b, volume_b)| AlignedPoint {
                close_a: c.close,
                close_b,
                volume_a: c.volume,
                volume_b,
            })
        })
        .filter(|p| p.close_a.is_finite() && p.close_b.is_finite())
        .collect()
}

fn window_correlation(points: &[AlignedPoint], volume_weighted: bool) -> Option<f64> {
    let x: Vec<f64> = points.iter().map(|p| p.close_a).collect();
    let y: Vec<f64> = points.iter().map(|p| p.close_b).collect();
    let weights: Vec<f64> = points
        .iter()
        .map(|p| (p.volume_a.max(0.0) * p.volume_b.max(0.0)).sqrt())
        .collect();
    weighted_pearson(&x, &y, volume_weighted.then_some(weights.as_slice()))
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Average daily USD volume over the last `days` candles
fn average_usd_volume(series: &CandleSeries, days: usize) -> f64 {
    mean(tail(&series.usd_volumes(), days))
}

/// Correlate one unordered pair of symbols
///
/// # Returns
/// `None` when the legs overlap on fewer than 7 days or either leg is below
/// the USD volume floor.
pub fn correlate_pair(
    a: &CandleSeries,
    b: &CandleSeries,
    settings: &CorrelationSettings,
) -> Option<CorrelationRecord> {
    let points = align(a, b);
    if points.len() < MIN_CORRELATION_DAYS {
        return None;
    }

    let volume_days = settings.timeframe_days.max(MIN_CORRELATION_DAYS);
    if average_usd_volume(a, volume_days) < settings.min_volume_usd
        || average_usd_volume(b, volume_days) < settings.min_volume_usd
    {
        return None;
    }

    let mut timeframe_correlations = BTreeMap::new();
    for timeframe in Timeframe::all() {
        let window = tail(&points, timeframe.days());
        if window.len() < MIN_CORRELATION_DAYS {
            continue;
        }
        if let Some(r) = window_correlation(window, settings.volume_weighted) {
            timeframe_correlations.insert(timeframe, r);
        }
    }

    let window = tail(&points, settings.timeframe_days.max(MIN_CORRELATION_DAYS));
    let correlation = window_correlation(window, settings.volume_weighted)?;
    let sample_size = window.len();
    let p_value = correlation_p_value(correlation, sample_size);

    let closes_a: Vec<f64> = window.iter().map(|p| p.close_a).collect();
    let closes_b: Vec<f64> = window.iter().map(|p| p.close_b).collect();
    let volatility = (calculate_annualized_volatility(&closes_a) + calculate_annualized_volatility(&closes_b))
        / 2.0
        / 100.0;

    Some(CorrelationRecord {
        pair_a: a.pair().to_string(),
        pair_b: b.pair().to_string(),
        correlation,
        p_value,
        significance: Significance::from_p_value(p_value),
        sample_size,
        timeframe_correlations,
        volatility,
        volatility_adjusted_correlation: correlation * (1.0 - volatility.min(1.0)),
    })
}

/// Sort by significance (High first), then by |correlation| descending
pub fn sort_correlations(records: &mut [CorrelationRecord]) {
    records.sort_by(|a, b| {
        a.significance.rank().cmp(&b.significance.rank()).then_with(|| {
            b.correlation
                .abs()
                .partial_cmp(&a.correlation.abs())
                .unwrap_or(Ordering::Equal)
        })
    });
}

/// Correlate every unordered pair in `series`
pub fn correlate_all(series: &[CandleSeries], settings: &CorrelationSettings) -> Vec<CorrelationRecord> {
    let mut records = Vec::new();
    for (i, a) in series.iter().enumerate() {
        for b in &series[i + 1..] {
            if let Some(record) = correlate_pair(a, b, settings) {
                records.push(record);
            }
        }
    }
    sort_correlations(&mut records);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;

    fn series(pair: &str, closes: &[f64], volume: f64) -> CandleSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(pair, i as i64 * 86_400, c, c, c, c, volume))
            .collect();
        CandleSeries::new(pair, candles)
    }

    fn settings() -> CorrelationSettings {
        CorrelationSettings {
            timeframe_days: 30,
            min_volume_usd: 300_000.0,
            volume_weighted: false,
        }
    }

    fn noisy(n: usize, seed: f64) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * seed).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn test_pearson_basics() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let z = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert!((weighted_pearson(&x, &y, None).unwrap() - 1.0).abs() < 1e-12);
        assert!((weighted_pearson(&x, &z, None).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(weighted_pearson(&x, &[1.0; 5], None), Some(0.0));
        assert_eq!(weighted_pearson(&x[..1], &y[..1], None), None);
        assert_eq!(weighted_pearson(&x, &y[..4], None), None);

        let w = [1.0, 1.0, 1.0, 1.0, 1.0];
        assert!((weighted_pearson(&x, &y, Some(&w)).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ln_gamma_known_values() {
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - PI.sqrt().ln()).abs() < 1e-10);
        assert!(ln_gamma(1.0).abs() < 1e-10);
    }

    #[test]
    fn test_incomplete_beta_symmetry() {
        // I_x(a, a) at x = 0.5 is exactly 0.5
        assert!((regularized_incomplete_beta(3.0, 3.0, 0.5) - 0.5).abs() < 1e-10);
        // I_x(1, 1) = x
        assert!((regularized_incomplete_beta(1.0, 1.0, 0.3) - 0.3).abs() < 1e-10);
    }

    #[test]
    fn test_p_value_ranges() {
        assert_eq!(correlation_p_value(0.5, 2), 1.0);
        assert_eq!(correlation_p_value(1.0, 30), 0.0);
        assert!((correlation_p_value(0.0, 30) - 1.0).abs() < 1e-9);

        // r = 0.8, n = 10: t = 3.77 on 8 df, two-tailed p ~ 0.0055
        let p = correlation_p_value(0.8, 10);
        assert!(p > 0.004 && p < 0.007, "p = {}", p);
        assert_eq!(Significance::from_p_value(p), Significance::High);

        assert!(correlation_p_value(0.3, 10) > 0.05);
    }

    #[test]
    fn test_identical_series_fully_correlated() {
        let closes = noisy(90, 0.7);
        let a = series("AAA-USD", &closes, 10_000.0);
        let b = series("BBB-USD", &closes, 10_000.0);

        let record = correlate_pair(&a, &b, &settings()).unwrap();
        assert!((record.correlation - 1.0).abs() < 1e-9);
        assert!(record.p_value < 1e-10);
        assert_eq!(record.significance, Significance::High);
        assert_eq!(record.sample_size, 30);
        assert_eq!(record.timeframe_correlations.len(), 3);
        assert!(record.volatility_adjusted_correlation <= record.correlation);
    }

    #[test]
    fn test_correlation_is_symmetric() {
        let a = series("AAA-USD", &noisy(90, 0.7), 10_000.0);
        let b = series("BBB-USD", &noisy(90, 1.3), 10_000.0);

        let ab = correlate_pair(&a, &b, &settings()).unwrap();
        let ba = correlate_pair(&b, &a, &settings()).unwrap();
        assert!((ab.correlation - ba.correlation).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_volume_floor_and_overlap() {
        let closes = noisy(90, 0.7);
        let rich = series("RICH-USD", &closes, 10_000.0);
        let thin = series("THIN-USD", &closes, 10.0);
        assert!(correlate_pair(&rich, &thin, &settings()).is_none());

        let short = series("NEW-USD", &closes[..5], 10_000.0);
        assert!(correlate_pair(&rich, &short, &settings()).is_none());
    }

    #[test]
    fn test_correlate_all_sorted() {
        let base = noisy(90, 0.7);
        let inverse: Vec<f64> = base.iter().map(|c| 300.0 - c).collect();
        let all = vec![
            series("AAA-USD", &base, 10_000.0),
            series("BBB-USD", &noisy(90, 2.9), 10_000.0),
            series("CCC-USD", &inverse, 10_000.0),
        ];

        let records = correlate_all(&all, &settings());
        assert_eq!(records.len(), 3);
        for pair in records.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.significance.rank() < b.significance.rank()
                    || (a.significance == b.significance && a.correlation.abs() >= b.correlation.abs())
            );
        }
        assert!((records[0].correlation.abs() - 1.0).abs() < 1e-9);
    }
}
