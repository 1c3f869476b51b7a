use crate::enums::{AdvisorDirection, AdvisorRegime, DataOrigin, Regime};
use crate::lenient;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One trading day for a symbol or for the synthetic `ALL` aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// Zero means the backend sent no usable price for the day.
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    /// A close/volume-only point, the shape the dashboard works with.
    pub fn new(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume,
        }
    }
}

/// A price point annotated with its simple day-over-day return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub ret: f64,
}

/// Trailing-window standard deviation of returns, as of `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPoint {
    pub date: NaiveDate,
    pub vol: f64,
}

/// The number of days classified into one regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeBucket {
    pub regime: Regime,
    pub count: usize,
}

/// One entry of the top gainers / top losers lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub symbol: String,
    /// Percentage change, e.g. `2.8` for +2.8%.
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub change: f64,
}

/// The response of `GET /market/summary`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketSummary {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_volume: f64,
    #[serde(default)]
    pub top_gainers: Vec<Mover>,
    #[serde(default)]
    pub top_losers: Vec<Mover>,
}

/// One quarter of financial ratios for a bank (or the industry average).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatio {
    pub quarter_date: String,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub p_b: Option<f64>,
    /// Every other numeric column the backend sent (GDP, Inflation, ...).
    pub extra: BTreeMap<String, f64>,
}

/// Model signals behind an advisor recommendation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdvisorSignals {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub predicted_return_21d: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub predicted_volatility_21d: Option<f64>,
    #[serde(default)]
    pub regime: Option<AdvisorRegime>,
    #[serde(default)]
    pub direction: Option<AdvisorDirection>,
}

/// The response of `POST /advisor/consult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorReport {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub recommendation: String,
    /// In `[0, 1]`.
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub confidence: f64,
    #[serde(default)]
    pub signals: AdvisorSignals,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub rationale: String,
}

/// The response of `GET /admin/logs`, oldest line first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminLogs {
    #[serde(default)]
    pub logs: Vec<String>,
}

impl AdminLogs {
    pub fn newest(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }

    /// Whether the newest line carries `marker`; older lines are ignored.
    pub fn newest_contains(&self, marker: &str) -> bool {
        self.newest().is_some_and(|line| line.contains(marker))
    }
}

/// Acknowledgement of a pipeline trigger or retrain request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobAck {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub status: String,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

impl JobAck {
    /// The backend answers 200 with `status: "Error"` when it could not start the job.
    pub fn is_rejected(&self) -> bool {
        self.status.eq_ignore_ascii_case("error")
    }
}

/// One validation sample: the true and predicted value of a model on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRow {
    pub symbol: String,
    pub model: String,
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// Training metrics for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetric {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rmse: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub accuracy: Option<f64>,
}

/// A dataset tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub data: T,
    pub origin: DataOrigin,
}

impl<T> Sourced<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Live,
        }
    }

    pub fn fallback(data: T, reason: impl Into<String>) -> Self {
        Self {
            data,
            origin: DataOrigin::Fallback(reason.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin.is_fallback()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            data: f(self.data),
            origin: self.origin,
        }
    }
}
