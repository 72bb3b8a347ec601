//! Numeric guards shared by every indicator and scorer.
//!
//! Indicator math runs on raw market data: zero volumes, flat ranges and
//! empty windows are routine. Every division and every "last value" lookup
//! goes through these helpers so that NaN and infinity never reach the
//! composite scorers.

/// Divide, returning 0.0 when the result would not be finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    safe_div_or(numerator, denominator, 0.0)
}

/// Divide, returning `default` when the denominator is zero or the result is not finite.
pub fn safe_div_or(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return default;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Replace NaN / infinity with `default`.
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Percentage change from `from` to `to`: ((to - from) / from) * 100
pub fn pct_change(from: f64, to: f64) -> f64 {
    safe_div(to - from, from) * 100.0
}

/// Clamp into [0, 1]; non-finite input maps to the neutral 0.5.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Last finite element of a computed sequence, if any.
pub fn last_value(values: &[f64]) -> Option<f64> {
    values.last().copied().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 2.0), 5.0);
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(f64::NAN, 1.0), 0.0);
        assert_eq!(safe_div_or(1.0, 0.0, 50.0), 50.0);
    }

    #[test]
    fn test_pct_change() {
        assert!((pct_change(100.0, 110.0) - 10.0).abs() < 1e-9);
        assert_eq!(pct_change(0.0, 110.0), 0.0);
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.5);
    }

    #[test]
    fn test_last_value() {
        assert_eq!(last_value(&[]), None);
        assert_eq!(last_value(&[1.0, 2.0]), Some(2.0));
        assert_eq!(last_value(&[1.0, f64::INFINITY]), None);
    }
}
