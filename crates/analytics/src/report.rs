use chrono::NaiveDate;
use core_types::{Regime, RegimeBucket, ReturnPoint, VolatilityPoint};
use serde::{Deserialize, Serialize};

/// The "at a glance" statistics over the trailing window.
///
/// Both values are `None` when the series is empty.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub expected_return: Option<f64>,
    pub risk_volatility: Option<f64>,
}

/// One row of the price/volume chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChartPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume_millions: f64,
    pub ret_pct: f64,
}

/// Everything the dashboard derives from one price series.
///
/// This struct is the final output of `AnalyticsEngine::snapshot` and is
/// rebuilt from scratch on every fetch; nothing in it outlives one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub returns: Vec<ReturnPoint>,
    pub volatility: Vec<VolatilityPoint>,
    /// Bull, Sideway, Bear.
    pub buckets: [RegimeBucket; 3],
    pub summary: SummaryStatistics,
    pub current_regime: Option<Regime>,
    pub price_chart: Vec<PriceChartPoint>,
}

impl DashboardSnapshot {
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// The last `n` chart rows paired with their rolling volatility.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = (&PriceChartPoint, &VolatilityPoint)> {
        let start = self.price_chart.len().saturating_sub(n);
        self.price_chart[start..]
            .iter()
            .zip(self.volatility[start..].iter())
    }
}
