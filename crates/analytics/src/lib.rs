//! # Bankdash Analytics Engine
//!
//! This crate turns raw price history fetched from the market backend into the
//! statistics and chart-ready series shown on the dashboard.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** No I/O and no knowledge of the backend. It depends only on
//!   `core-types`.
//! - **Lenient input:** Malformed numbers are treated as "no signal" (zero), never
//!   rejected. The only errors are invalid engine parameters.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: returns, rolling volatility, regimes and summary statistics.
//! - `aggregate_by_date_averaged`: per-date averaging for `ALL` aggregates.
//! - `TimeRange` / `filter_range`: the explorer's trailing windows.
//! - `validation_series`: true-vs-predicted series for one model.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod range;
pub mod report;
pub mod validation;

pub use aggregate::{DateAverage, aggregate_by_date_averaged};
pub use engine::{
    AnalyticsEngine, DEFAULT_DOWN_THRESHOLD, DEFAULT_UP_THRESHOLD, DEFAULT_WINDOW, classify_regime,
    compute_returns, regime_buckets, rolling_volatility, sort_chronological, summary_statistics,
};
pub use error::AnalyticsError;
pub use range::{TimeRange, filter_range};
pub use report::{DashboardSnapshot, PriceChartPoint, SummaryStatistics};
pub use validation::{ValidationPoint, validation_models, validation_series, validation_symbols};
