//! Volume indicators.

use super::series::calculate_ema;
use crate::utils::{last_value, safe_div};

/// On-Balance Volume series, starting at 0 on the first bar
pub fn calculate_obv_series(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let n = closes.len().min(volumes.len());
    if n == 0 {
        return Vec::new();
    }

    let mut obv = Vec::with_capacity(n);
    let mut running = 0.0;
    obv.push(running);
    for i in 1..n {
        if closes[i] > closes[i - 1] {
            running += volumes[i];
        } else if closes[i] < closes[i - 1] {
            running -= volumes[i];
        }
        obv.push(running);
    }
    obv
}

/// Latest On-Balance Volume
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Option<f64> {
    last_value(&calculate_obv_series(closes, volumes))
}

/// Volume oscillator: (EMA(fast) - EMA(slow)) / EMA(slow) * 100
pub fn calculate_volume_oscillator(volumes: &[f64], fast: usize, slow: usize) -> Option<f64> {
    let fast_ema = last_value(&calculate_ema(volumes, fast))?;
    let slow_ema = last_value(&calculate_ema(volumes, slow))?;
    Some(safe_div(fast_ema - slow_ema, slow_ema) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obv_accumulates_by_direction() {
        let closes = [10.0, 11.0, 10.5, 10.5, 12.0];
        let volumes = [100.0, 200.0, 50.0, 80.0, 300.0];
        assert_eq!(
            calculate_obv_series(&closes, &volumes),
            vec![0.0, 200.0, 150.0, 150.0, 450.0]
        );
        assert_eq!(calculate_obv(&closes, &volumes), Some(450.0));
        assert_eq!(calculate_obv(&[], &[]), None);
    }

    #[test]
    fn test_volume_oscillator() {
        let flat = vec![1_000.0; 20];
        assert!(calculate_volume_oscillator(&flat, 5, 10).unwrap().abs() < 1e-9);

        let mut surging = vec![1_000.0; 15];
        surging.extend([5_000.0; 5]);
        assert!(calculate_volume_oscillator(&surging, 5, 10).unwrap() > 0.0);

        assert_eq!(calculate_volume_oscillator(&[1.0; 5], 5, 10), None);
        assert_eq!(calculate_volume_oscillator(&[0.0; 20], 5, 10), Some(0.0));
    }
}
