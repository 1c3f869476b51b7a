use crate::error::AnalyticsError;
use crate::report::{DashboardSnapshot, PriceChartPoint, SummaryStatistics};
use core_types::{PricePoint, Regime, RegimeBucket, ReturnPoint, VolatilityPoint};

/// Trailing window used for volatility and summary statistics.
pub const DEFAULT_WINDOW: usize = 21;
/// A daily return at or above this is a Bull day.
pub const DEFAULT_UP_THRESHOLD: f64 = 0.002;
/// A daily return at or below this is a Bear day.
pub const DEFAULT_DOWN_THRESHOLD: f64 = -0.002;

/// A stateless calculator that turns a raw price series into dashboard statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsEngine {
    window: usize,
    up_threshold: f64,
    down_threshold: f64,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            up_threshold: DEFAULT_UP_THRESHOLD,
            down_threshold: DEFAULT_DOWN_THRESHOLD,
        }
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidWindow` for a zero window and
    /// `AnalyticsError::InvalidThresholds` unless `down_threshold < up_threshold`.
    pub fn with_params(
        window: usize,
        up_threshold: f64,
        down_threshold: f64,
    ) -> Result<Self, AnalyticsError> {
        if window == 0 {
            return Err(AnalyticsError::InvalidWindow(window));
        }
        if !(down_threshold < up_threshold) {
            return Err(AnalyticsError::InvalidThresholds {
                up: up_threshold,
                down: down_threshold,
            });
        }
        Ok(Self {
            window,
            up_threshold,
            down_threshold,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn classify(&self, ret: f64) -> Regime {
        classify_regime(ret, self.up_threshold, self.down_threshold)
    }

    pub fn rolling_volatility(&self, returns: &[ReturnPoint]) -> Vec<VolatilityPoint> {
        rolling_volatility(returns, self.window)
    }

    pub fn summary(&self, returns: &[ReturnPoint]) -> SummaryStatistics {
        summary_statistics(returns, self.window)
    }

    pub fn regime_buckets(&self, returns: &[ReturnPoint]) -> [RegimeBucket; 3] {
        regime_buckets(returns, self.up_threshold, self.down_threshold)
    }

    /// The regime of the last day alone, `None` for an empty series.
    pub fn current_regime(&self, returns: &[ReturnPoint]) -> Option<Regime> {
        returns.last().map(|point| self.classify(point.ret))
    }

    /// Runs the full pipeline over a raw, possibly unsorted series.
    pub fn snapshot(&self, series: Vec<PricePoint>) -> DashboardSnapshot {
        let sorted = sort_chronological(series);
        let returns = compute_returns(&sorted);
        let volatility = self.rolling_volatility(&returns);
        let buckets = self.regime_buckets(&returns);
        let summary = self.summary(&returns);
        let current_regime = self.current_regime(&returns);
        let price_chart = returns
            .iter()
            .map(|point| PriceChartPoint {
                date: point.date,
                close: point.close,
                volume_millions: point.volume / 1_000_000.0,
                ret_pct: point.ret * 100.0,
            })
            .collect();

        tracing::debug!(
            points = returns.len(),
            window = self.window,
            regime = ?current_regime,
            "Computed dashboard snapshot."
        );

        DashboardSnapshot {
            returns,
            volatility,
            buckets,
            summary,
            current_regime,
            price_chart,
        }
    }
}

/// Sorts a series ascending by date. The sort is stable and never deduplicates.
pub fn sort_chronological(mut series: Vec<PricePoint>) -> Vec<PricePoint> {
    series.sort_by_key(|point| point.date);
    series
}

/// Computes simple day-over-day returns over a chronologically sorted series.
///
/// A zero (or non-finite) close is missing data: its own return is `0` and it
/// does not replace the carried close, so the next valid day is measured
/// against the last valid price.
pub fn compute_returns(sorted: &[PricePoint]) -> Vec<ReturnPoint> {
    let mut prev_close: Option<f64> = None;
    sorted
        .iter()
        .map(|point| {
            let close = finite_or_zero(point.close);
            let volume = finite_or_zero(point.volume);
            let ret = match prev_close {
                Some(prev) if prev != 0.0 && close != 0.0 => (close - prev) / prev,
                _ => 0.0,
            };
            if close != 0.0 {
                prev_close = Some(close);
            }
            ReturnPoint {
                date: point.date,
                close,
                volume,
                ret,
            }
        })
        .collect()
}

/// Rolling population standard deviation of `ret`.
///
/// The window at index `i` is `returns[i + 1 - w ..= i]`, truncated at the
/// start of the series, so early points use every return seen so far.
pub fn rolling_volatility(returns: &[ReturnPoint], window: usize) -> Vec<VolatilityPoint> {
    let window = window.max(1);
    let rets: Vec<f64> = returns.iter().map(|point| point.ret).collect();
    returns
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let start = (i + 1).saturating_sub(window);
            VolatilityPoint {
                date: point.date,
                vol: population_std_dev(&rets[start..=i]).unwrap_or(0.0),
            }
        })
        .collect()
}

/// `Bull` at or above `up`, `Bear` at or below `down`, `Sideway` in between.
pub fn classify_regime(ret: f64, up: f64, down: f64) -> Regime {
    if ret >= up {
        Regime::Bull
    } else if ret <= down {
        Regime::Bear
    } else {
        Regime::Sideway
    }
}

/// Counts the days in each regime, skipping day 0 which has no return.
///
/// Always returns Bull, Sideway, Bear in that order.
pub fn regime_buckets(returns: &[ReturnPoint], up: f64, down: f64) -> [RegimeBucket; 3] {
    let mut buckets = Regime::ALL.map(|regime| RegimeBucket { regime, count: 0 });
    for point in returns.iter().skip(1) {
        let regime = classify_regime(point.ret, up, down);
        if let Some(bucket) = buckets.iter_mut().find(|b| b.regime == regime) {
            bucket.count += 1;
        }
    }
    buckets
}

/// Mean and population standard deviation of the trailing `window` returns.
pub fn summary_statistics(returns: &[ReturnPoint], window: usize) -> SummaryStatistics {
    let start = returns.len().saturating_sub(window.max(1));
    let tail: Vec<f64> = returns[start..].iter().map(|point| point.ret).collect();
    SummaryStatistics {
        expected_return: mean(&tail),
        risk_volatility: population_std_dev(&tail),
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation dividing by `n`, not `n - 1`.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|v| (v - mean) * (v - mean))
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
