//! Wire shapes of the backend responses and their conversion into domain types.
//!
//! The backend is loosely typed: numbers arrive as `null`, strings or floats,
//! and column names vary between endpoints. Everything is normalized here so
//! the rest of the client only sees `core-types` structs.

use core_types::lenient;
use core_types::{FinancialRatio, PricePoint, ValidationRow};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Status string of a training envelope that carries data.
pub const SUCCESS_STATUS: &str = "Success";

/// One row of `GET /market/history/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPriceRow {
    #[serde(default, alias = "Date", deserialize_with = "lenient::string_or_empty")]
    pub date: String,
    #[serde(default, alias = "Open", deserialize_with = "lenient::opt_f64")]
    pub open: Option<f64>,
    #[serde(default, alias = "High", deserialize_with = "lenient::opt_f64")]
    pub high: Option<f64>,
    #[serde(default, alias = "Low", deserialize_with = "lenient::opt_f64")]
    pub low: Option<f64>,
    #[serde(default, alias = "Close", deserialize_with = "lenient::f64_or_zero")]
    pub close: f64,
    #[serde(default, alias = "Volume", deserialize_with = "lenient::f64_or_zero")]
    pub volume: f64,
}

impl RawPriceRow {
    /// `None` when the date cannot be parsed.
    pub fn into_point(self) -> Option<PricePoint> {
        let date = lenient::parse_calendar_date(&self.date)?;
        Some(PricePoint {
            date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

/// One quarter of `GET /market/financials/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFinancialRow {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub quarter_date: String,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl RawFinancialRow {
    pub fn into_ratio(mut self) -> FinancialRatio {
        let roe = take_number(&mut self.columns, &["ROE", "roe"]);
        let roa = take_number(&mut self.columns, &["ROA", "roa"]);
        let p_b = take_number(&mut self.columns, &["P_B", "p_b", "PB"]);

        let extra = self
            .columns
            .iter()
            .filter_map(|(name, value)| lenient::number(value).map(|n| (name.clone(), n)))
            .collect();

        FinancialRatio {
            quarter_date: self.quarter_date,
            roe,
            roa,
            p_b,
            extra,
        }
    }
}

// Removes every alias of a column and returns the first numeric value.
fn take_number(columns: &mut BTreeMap<String, Value>, names: &[&str]) -> Option<f64> {
    names
        .iter()
        .filter_map(|name| columns.remove(*name))
        .collect::<Vec<_>>()
        .iter()
        .find_map(lenient::number)
}

/// One sample of `GET /admin/training-results`.
///
/// Rows carry either `date` or `time` depending on the model that produced them.
#[derive(Debug, Clone, Deserialize)]
pub struct RawValidationRow {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub model: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "true", default, deserialize_with = "lenient::f64_or_zero")]
    pub actual: f64,
    #[serde(rename = "pred", default, deserialize_with = "lenient::f64_or_zero")]
    pub predicted: f64,
}

impl RawValidationRow {
    pub fn into_row(self) -> Option<ValidationRow> {
        let date = [self.date.as_deref(), self.time.as_deref()]
            .into_iter()
            .flatten()
            .find_map(lenient::parse_calendar_date)?;
        Some(ValidationRow {
            symbol: self.symbol,
            model: self.model,
            date,
            actual: self.actual,
            predicted: self.predicted,
        })
    }
}

/// The `{status, data, message}` wrapper of the training endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub status: String,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// The payload, only when the backend reported success.
    pub fn into_success(self) -> Option<T> {
        if self.status == SUCCESS_STATUS {
            self.data
        } else {
            None
        }
    }
}
