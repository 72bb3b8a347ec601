//! Price-Level Analyzer
//!
//! Detects support and resistance zones by clustering every candle high and
//! low into price buckets. Levels are recomputed from scratch on every call;
//! nothing about a bucket survives between analyses.
//!
//! ## Strength weights
//!
//! | Component       | Weight | Measure                                         |
//! |-----------------|--------|-------------------------------------------------|
//! | Volume          | 25%    | avg touch volume / avg volume, capped at 2x     |
//! | Touch count     | 20%    | touches / 10, capped                            |
//! | Recency         | 20%    | exp(-bars since last touch / 30)                |
//! | Rejection       | 25%    | avg reaction within 5 bars, in ATRs, capped 3   |
//! | Round number    | 10%    | proximity to a psychological price              |

use crate::constants::{
    ATR_PERIOD, FALLBACK_RESISTANCE_RATIO, FALLBACK_SUPPORT_RATIO, FIBONACCI_RATIOS,
    LEVEL_REACTION_CANDLES, MAX_PRICE_LEVELS, MIN_LEVEL_STRENGTH, MIN_LEVEL_TOUCHES,
    SUB_CENT_PRICE,
};
use crate::indicators::calculate_atr_series;
use crate::models::{Candle, FibonacciLevel, FibonacciLevels, LevelType, PriceLevel, PriceLevels};
use crate::utils::{last_value, safe_div};
use std::cmp::Ordering;

const VOLUME_WEIGHT: f64 = 0.25;
const TOUCH_WEIGHT: f64 = 0.20;
const RECENCY_WEIGHT: f64 = 0.20;
const REJECTION_WEIGHT: f64 = 0.25;
const PSYCHOLOGICAL_WEIGHT: f64 = 0.10;

/// Bars over which recency decays by a factor of e
const RECENCY_DECAY_BARS: f64 = 30.0;

/// Rejection moves are capped at this many ATRs
const MAX_REJECTION_ATR: f64 = 3.0;

/// ATR below this share of price marks a tight trading range
const TIGHT_RANGE_ATR_RATIO: f64 = 0.01;

/// How price reacted after touching a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Support,
    Resistance,
    Unknown,
}

#[derive(Debug, Clone, Copy)]
struct Touch {
    price: f64,
    volume: f64,
    index: usize,
    behavior: Behavior,
    /// Reaction size in [0, 1]
    rejection: f64,
}

/// Accumulated touches around one price; `id` is stable across center updates and merges
#[derive(Debug, Clone)]
struct Bucket {
    id: usize,
    center: f64,
    volume: f64,
    touches: usize,
    support_votes: usize,
    resistance_votes: usize,
    rejection_sum: f64,
    last_index: usize,
}

impl Bucket {
    fn new(id: usize, touch: &Touch) -> Self {
        let mut bucket = Self {
            id,
            center: touch.price,
            volume: 0.0,
            touches: 0,
            support_votes: 0,
            resistance_votes: 0,
            rejection_sum: 0.0,
            last_index: touch.index,
        };
        bucket.absorb(touch);
        bucket
    }

    fn absorb(&mut self, touch: &Touch) {
        let total = self.volume + touch.volume;
        self.center = if total > 0.0 {
            (self.center * self.volume + touch.price * touch.volume) / total
        } else {
            (self.center * self.touches as f64 + touch.price) / (self.touches as f64 + 1.0)
        };
        self.volume = total;
        self.touches += 1;
        self.rejection_sum += touch.rejection;
        self.last_index = self.last_index.max(touch.index);
        match touch.behavior {
            Behavior::Support => self.support_votes += 1,
            Behavior::Resistance => self.resistance_votes += 1,
            Behavior::Unknown => {}
        }
    }

    fn merge(&mut self, other: Bucket) {
        let total = self.volume + other.volume;
        let touches = self.touches + other.touches;
        self.center = if total > 0.0 {
            (self.center * self.volume + other.center * other.volume) / total
        } else {
            (self.center * self.touches as f64 + other.center * other.touches as f64) / touches as f64
        };
        self.id = self.id.min(other.id);
        self.volume = total;
        self.touches = touches;
        self.support_votes += other.support_votes;
        self.resistance_votes += other.resistance_votes;
        self.rejection_sum += other.rejection_sum;
        self.last_index = self.last_index.max(other.last_index);
    }

    fn net_behavior(&self) -> Behavior {
        match self.support_votes.cmp(&self.resistance_votes) {
            Ordering::Greater => Behavior::Support,
            Ordering::Less => Behavior::Resistance,
            Ordering::Equal => Behavior::Unknown,
        }
    }
}

/// Touch-grouping tolerance: half an ATR, or 1% of price for sub-cent assets
/// (and whenever no ATR is available)
pub fn price_tolerance(price: f64, atr: Option<f64>) -> f64 {
    match atr {
        Some(atr) if price >= SUB_CENT_PRICE && atr > 0.0 && atr.is_finite() => atr * 0.5,
        _ => (price * 0.01).abs(),
    }
}

/// Round-number bonus in [0, 1]: 1 near a half-magnitude multiple
/// (e.g. 50, 100, 150 for prices in the hundreds), 0.5 near a tenth-magnitude multiple
pub fn psychological_bonus(price: f64, tolerance: f64) -> f64 {
    if !(price > 0.0) || !price.is_finite() {
        return 0.0;
    }
    let magnitude = 10f64.powf(price.log10().floor());
    let near = |step: f64| {
        let nearest = (price / step).round() * step;
        (price - nearest).abs() <= tolerance.max(price * 0.001)
    };

    if near(magnitude / 2.0) {
        1.0
    } else if near(magnitude / 10.0) {
        0.5
    } else {
        0.0
    }
}

/// Classify the reaction in the bars after a touch
fn classify_reaction(touch_price: f64, next_closes: &[f64], atr: f64) -> (Behavior, f64) {
    if next_closes.is_empty() {
        return (Behavior::Unknown, 0.0);
    }
    let max_close = next_closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_close = next_closes.iter().copied().fold(f64::INFINITY, f64::min);
    let move_up = (max_close - touch_price).max(0.0);
    let move_down = (touch_price - min_close).max(0.0);

    let (behavior, reaction) = match move_up.partial_cmp(&move_down) {
        Some(Ordering::Greater) => (Behavior::Support, move_up),
        Some(Ordering::Less) => (Behavior::Resistance, move_down),
        _ => (Behavior::Unknown, 0.0),
    };

    let rejection = safe_div(reaction, atr).min(MAX_REJECTION_ATR) / MAX_REJECTION_ATR;
    (behavior, rejection)
}

fn collect_touches(candles: &[Candle], atr: f64) -> Vec<Touch> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let mut touches = Vec::with_capacity(candles.len() * 2);

    for (index, candle) in candles.iter().enumerate() {
        let end = (index + 1 + LEVEL_REACTION_CANDLES).min(closes.len());
        let next = &closes[(index + 1).min(end)..end];

        for price in [candle.low, candle.high] {
            if !price.is_finite() || price <= 0.0 {
                continue;
            }
            let (behavior, rejection) = classify_reaction(price, next, atr);
            touches.push(Touch {
                price,
                volume: candle.volume.max(0.0),
                index,
                behavior,
                rejection,
            });
        }
    }
    touches
}

/// Cluster touches into buckets, merging buckets whose centers drift within tolerance
fn build_buckets(touches: &[Touch], tolerance: f64) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut next_id = 0;

    for touch in touches {
        let nearest = buckets
            .iter()
            .enumerate()
            .map(|(i, b)| (i, (b.center - touch.price).abs()))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(i, _)| i);

        let updated = match nearest {
            Some(i) => {
                buckets[i].absorb(touch);
                buckets[i].id
            }
            None => {
                buckets.push(Bucket::new(next_id, touch));
                next_id += 1;
                continue;
            }
        };

        // A moved center may now overlap a neighbour; merging keeps the smaller id
        let mut tracked = updated;
        loop {
            let Some(pos) = buckets.iter().position(|b| b.id == tracked) else { break };
            let center = buckets[pos].center;
            let Some(other) = buckets
                .iter()
                .position(|b| b.id != tracked && (b.center - center).abs() <= tolerance)
            else {
                break;
            };
            let absorbed = buckets.remove(other);
            let pos = if other < pos { pos - 1 } else { pos };
            buckets[pos].merge(absorbed);
            tracked = buckets[pos].id;
        }
    }

    buckets
}

struct ScoredBucket {
    bucket: Bucket,
    strength: f64,
}

fn score_bucket(bucket: &Bucket, avg_volume: f64, last_index: usize, tolerance: f64) -> f64 {
    let touches = bucket.touches as f64;
    let volume_score = (safe_div(bucket.volume / touches, avg_volume)).min(2.0) / 2.0;
    let touch_score = touches.min(10.0) / 10.0;
    let age = last_index.saturating_sub(bucket.last_index) as f64;
    let recency_score = (-age / RECENCY_DECAY_BARS).exp();
    let rejection_score = safe_div(bucket.rejection_sum, touches);
    let psychological = psychological_bonus(bucket.center, tolerance);

    (volume_score * VOLUME_WEIGHT
        + touch_score * TOUCH_WEIGHT
        + recency_score * RECENCY_WEIGHT
        + rejection_score * REJECTION_WEIGHT
        + psychological * PSYCHOLOGICAL_WEIGHT)
        .clamp(0.0, 1.0)
}

/// Decide which side of the book a bucket belongs to, or `None` if ambiguous
fn classify_side(bucket: &Bucket, price: f64, tolerance: f64, tight_range: bool) -> Option<LevelType> {
    let behavior = bucket.net_behavior();
    let position = if bucket.center < price - tolerance {
        Some(LevelType::Support)
    } else if bucket.center > price + tolerance {
        Some(LevelType::Resistance)
    } else {
        None
    };

    let from_behavior = match behavior {
        Behavior::Support => Some(LevelType::Support),
        Behavior::Resistance => Some(LevelType::Resistance),
        Behavior::Unknown => None,
    };

    match (position, from_behavior) {
        (Some(side), None) => Some(side),
        (Some(side), Some(reaction)) if side == reaction => Some(side),
        // below price but rejected from above (or the mirror)
        (Some(side), Some(_)) => tight_range.then_some(side),
        // sitting on the current price
        (None, reaction) => {
            if !tight_range {
                reaction
            } else if bucket.center <= price {
                Some(LevelType::Support)
            } else {
                Some(LevelType::Resistance)
            }
        }
    }
}

fn describe(level_type: LevelType, strength: f64, touches: usize) -> String {
    let grade = if strength >= 0.6 {
        "Strong"
    } else if strength >= 0.35 {
        "Moderate"
    } else {
        "Weak"
    };
    format!("{} {} tested {} times", grade, level_type, touches)
}

/// Fallback result when no usable level is found
fn fallback_levels(price: f64, tolerance: f64) -> PriceLevels {
    finish(Vec::new(), Vec::new(), None, None, price, tolerance)
}

/// Highest price strictly below `price`
fn closest_below(prices: impl Iterator<Item = f64>, price: f64) -> Option<f64> {
    prices
        .filter(|p| *p < price)
        .fold(None, |best: Option<f64>, p| Some(best.map_or(p, |b| b.max(p))))
}

/// Lowest price strictly above `price`
fn closest_above(prices: impl Iterator<Item = f64>, price: f64) -> Option<f64> {
    prices
        .filter(|p| *p > price)
        .fold(None, |best: Option<f64>, p| Some(best.map_or(p, |b| b.min(p))))
}

fn finish(
    supports: Vec<PriceLevel>,
    resistances: Vec<PriceLevel>,
    nearest_support: Option<f64>,
    nearest_resistance: Option<f64>,
    price: f64,
    tolerance: f64,
) -> PriceLevels {
    let nearest_support = nearest_support.unwrap_or(price * FALLBACK_SUPPORT_RATIO);
    let nearest_resistance = nearest_resistance.unwrap_or(price * FALLBACK_RESISTANCE_RATIO);

    PriceLevels {
        supports,
        resistances,
        nearest_support,
        nearest_resistance,
        channel_width: safe_div(nearest_resistance - nearest_support, price) * 100.0,
        distance_to_support: safe_div(price - nearest_support, price) * 100.0,
        distance_to_resistance: safe_div(nearest_resistance - price, price) * 100.0,
        tolerance,
    }
}

fn rank(mut side: Vec<ScoredBucket>, level_type: LevelType) -> Vec<PriceLevel> {
    side.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(Ordering::Equal));
    side.into_iter()
        .take(MAX_PRICE_LEVELS)
        .map(|scored| PriceLevel {
            price: scored.bucket.center,
            strength: scored.strength * 100.0,
            level_type,
            touches: scored.bucket.touches,
            description: describe(level_type, scored.strength, scored.bucket.touches),
        })
        .collect()
}

/// Nearest levels come from every qualifying bucket on each side; only the
/// reported lists are cut to the strongest three
fn assemble_levels(
    supports: Vec<ScoredBucket>,
    resistances: Vec<ScoredBucket>,
    price: f64,
    tolerance: f64,
) -> PriceLevels {
    let nearest_support = closest_below(supports.iter().map(|s| s.bucket.center), price);
    let nearest_resistance = closest_above(resistances.iter().map(|s| s.bucket.center), price);

    finish(
        rank(supports, LevelType::Support),
        rank(resistances, LevelType::Resistance),
        nearest_support,
        nearest_resistance,
        price,
        tolerance,
    )
}

/// Detect up to three supports and three resistances around `current_price`
///
/// # Arguments
/// * `candles` - Level window (typically the last 180 daily candles), oldest first
/// * `current_price` - Reference price (latest close)
///
/// # Returns
/// Ranked levels (strongest first) with nearest-level, channel-width and
/// distance metrics. Without usable levels the nearest support/resistance
/// fall back to 85% / 115% of the current price.
pub fn analyze_price_levels(candles: &[Candle], current_price: f64) -> PriceLevels {
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let atr = last_value(&calculate_atr_series(&highs, &lows, &closes, ATR_PERIOD));

    let tolerance = price_tolerance(current_price, atr);
    if candles.is_empty() || !(current_price > 0.0) || !current_price.is_finite() {
        return fallback_levels(current_price, tolerance);
    }

    // Reactions are measured in ATRs; fall back to twice the tolerance
    let reaction_unit = atr.filter(|a| *a > 0.0).unwrap_or(tolerance * 2.0);
    let tight_range =
        current_price < SUB_CENT_PRICE || safe_div(reaction_unit, current_price) < TIGHT_RANGE_ATR_RATIO;

    let touches = collect_touches(candles, reaction_unit);
    let buckets = build_buckets(&touches, tolerance);

    let avg_volume = candles.iter().map(|c| c.volume.max(0.0)).sum::<f64>() / candles.len() as f64;
    let last_index = candles.len() - 1;

    let mut supports: Vec<ScoredBucket> = Vec::new();
    let mut resistances: Vec<ScoredBucket> = Vec::new();
    for bucket in buckets {
        if bucket.touches < MIN_LEVEL_TOUCHES {
            continue;
        }
        let strength = score_bucket(&bucket, avg_volume, last_index, tolerance);
        if strength <= MIN_LEVEL_STRENGTH {
            continue;
        }
        match classify_side(&bucket, current_price, tolerance, tight_range) {
            Some(LevelType::Support) => supports.push(ScoredBucket { bucket, strength }),
            Some(LevelType::Resistance) => resistances.push(ScoredBucket { bucket, strength }),
            None => {}
        }
    }

    assemble_levels(supports, resistances, current_price, tolerance)
}

/// Fibonacci retracements between `high` and `low`; `None` unless `high > low`
pub fn calculate_fibonacci_levels(high: f64, low: f64) -> Option<FibonacciLevels> {
    if !high.is_finite() || !low.is_finite() || high <= low {
        return None;
    }
    let range = high - low;
    Some(FibonacciLevels {
        high,
        low,
        levels: FIBONACCI_RATIOS
            .iter()
            .map(|&ratio| FibonacciLevel {
                ratio,
                price: high - range * ratio,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + 10.0 * (i as f64 * std::f64::consts::PI / 10.0).sin();
                Candle::new("WAVE-USD", i as i64 * 86_400, close, close + 1.0, close - 1.0, close, 1_000.0)
            })
            .collect()
    }

    fn touch(price: f64, index: usize) -> Touch {
        Touch {
            price,
            volume: 1.0,
            index,
            behavior: Behavior::Unknown,
            rejection: 0.0,
        }
    }

    #[test]
    fn test_wave_levels_bounded_and_sided() {
        let candles = wave_candles(180);
        let price = candles.last().unwrap().close;
        let levels = analyze_price_levels(&candles, price);

        assert!(!levels.supports.is_empty());
        assert!(!levels.resistances.is_empty());
        assert!(levels.supports.len() <= 3);
        assert!(levels.resistances.len() <= 3);

        for level in levels.supports.iter().chain(levels.resistances.iter()) {
            assert!(level.strength > 15.0 && level.strength <= 100.0);
            assert!(level.touches >= 2);
        }
        assert!(levels.supports.iter().all(|l| l.level_type == LevelType::Support));
        assert!(levels.nearest_support < price);
        assert!(levels.nearest_resistance > price);
        assert!(levels.channel_width > 0.0);
    }

    fn scored(price: f64, strength: f64) -> ScoredBucket {
        let mut bucket = Bucket::new(0, &touch(price, 0));
        bucket.absorb(&touch(price, 1));
        ScoredBucket { bucket, strength }
    }

    #[test]
    fn test_nearest_support_outside_top_three() {
        // the closest support is the weakest and is not reported in the ranked list
        let supports = vec![scored(90.0, 0.9), scored(85.0, 0.8), scored(80.0, 0.7), scored(98.0, 0.2)];
        let resistances = vec![scored(120.0, 0.9), scored(115.0, 0.8), scored(112.0, 0.7), scored(101.5, 0.2)];

        let levels = assemble_levels(supports, resistances, 100.0, 1.0);
        assert_eq!(levels.supports.len(), 3);
        assert!(levels.supports.iter().all(|l| l.price != 98.0));
        assert_eq!(levels.resistances.len(), 3);

        assert_eq!(levels.nearest_support, 98.0);
        assert_eq!(levels.nearest_resistance, 101.5);
        assert!((levels.distance_to_support - 2.0).abs() < 1e-9);
        assert!((levels.distance_to_resistance - 1.5).abs() < 1e-9);
        assert!((levels.channel_width - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_without_candles() {
        let levels = analyze_price_levels(&[], 200.0);
        assert!(levels.supports.is_empty());
        assert!((levels.nearest_support - 170.0).abs() < 1e-9);
        assert!((levels.nearest_resistance - 230.0).abs() < 1e-9);
        assert!((levels.channel_width - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_tolerance_rules() {
        assert_eq!(price_tolerance(100.0, Some(4.0)), 2.0);
        assert!((price_tolerance(0.005, Some(0.001)) - 0.00005).abs() < 1e-12);
        assert_eq!(price_tolerance(100.0, None), 1.0);
    }

    #[test]
    fn test_buckets_merge_when_centers_drift() {
        // 100 and 102.2 start apart; repeated touches at 101 pull the first
        // center toward the second until they overlap
        let touches = vec![
            touch(100.0, 0),
            touch(102.2, 1),
            touch(101.0, 2),
            touch(101.0, 3),
            touch(101.0, 4),
        ];
        let buckets = build_buckets(&touches, 1.5);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].touches, 5);
        assert_eq!(buckets[0].id, 0);
    }

    #[test]
    fn test_reaction_classification() {
        let (behavior, rejection) = classify_reaction(100.0, &[101.0, 104.0, 103.0], 2.0);
        assert_eq!(behavior, Behavior::Support);
        assert!((rejection - 2.0 / 3.0).abs() < 1e-9);

        let (behavior, rejection) = classify_reaction(100.0, &[95.0, 90.0], 2.0);
        assert_eq!(behavior, Behavior::Resistance);
        assert_eq!(rejection, 1.0);

        assert_eq!(classify_reaction(100.0, &[], 2.0).0, Behavior::Unknown);
    }

    #[test]
    fn test_psychological_bonus() {
        assert_eq!(psychological_bonus(150.0, 0.1), 1.0);
        assert_eq!(psychological_bonus(130.0, 0.1), 0.5);
        assert_eq!(psychological_bonus(137.0, 0.1), 0.0);
        assert_eq!(psychological_bonus(0.0, 0.1), 0.0);
    }

    #[test]
    fn test_fibonacci_levels() {
        let fib = calculate_fibonacci_levels(200.0, 100.0).unwrap();
        assert_eq!(fib.levels.len(), 7);
        assert_eq!(fib.levels[0].price, 200.0);
        assert!((fib.levels[3].price - 150.0).abs() < 1e-9);
        assert_eq!(fib.levels[6].price, 100.0);
        assert!(calculate_fibonacci_levels(100.0, 100.0).is_none());
    }
}
