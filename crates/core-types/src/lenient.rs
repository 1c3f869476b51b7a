//! Lenient decoders for backend JSON.
//!
//! The backend is a dataframe serializer, so numeric columns arrive as numbers,
//! numeric strings, `null` (from NaN) or not at all. Absence is "no signal":
//! required values coerce to `0.0`, optional ones to `None`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interprets a raw JSON value as a finite number.
pub fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// `deserialize_with` target for a number that defaults to `0.0`.
///
/// Pair it with `#[serde(default)]` so a missing field also yields zero.
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number).unwrap_or(0.0))
}

/// `deserialize_with` target for an optional number.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number))
}

/// `deserialize_with` target for a string that tolerates `null` and numbers.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// Parses the calendar date at the start of a date or datetime string.
///
/// Accepts `2024-01-31`, `2024-01-31 00:00:00` and `2024-01-31T00:00:00Z`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "f64_or_zero")]
        close: f64,
        #[serde(default, deserialize_with = "opt_f64")]
        rmse: Option<f64>,
    }

    #[test]
    fn numbers_coerce_from_strings_nulls_and_absence() {
        let row: Row = serde_json::from_str(r#"{"close": "101.5", "rmse": null}"#).unwrap();
        assert_eq!(row.close, 101.5);
        assert_eq!(row.rmse, None);

        let row: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(row.close, 0.0);

        let row: Row = serde_json::from_str(r#"{"close": null, "rmse": 0.25}"#).unwrap();
        assert_eq!(row.close, 0.0);
        assert_eq!(row.rmse, Some(0.25));

        let row: Row = serde_json::from_str(r#"{"close": "NaN"}"#).unwrap();
        assert_eq!(row.close, 0.0);
    }

    #[test]
    fn calendar_dates_ignore_time_suffixes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31);
        assert_eq!(parse_calendar_date("2024-01-31"), expected);
        assert_eq!(parse_calendar_date("2024-01-31 00:00:00"), expected);
        assert_eq!(parse_calendar_date("2024-01-31T09:15:00Z"), expected);
        assert_eq!(parse_calendar_date("31/01/2024"), None);
        assert_eq!(parse_calendar_date("N/A"), None);
    }
}
