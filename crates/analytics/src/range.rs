use crate::error::AnalyticsError;
use chrono::{Datelike, Days, Months, NaiveDate};
use core_types::PricePoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trailing time window for the explorer charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    #[default]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl TimeRange {
    pub const ALL_RANGES: [TimeRange; 7] = [
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::YearToDate,
        TimeRange::OneYear,
        TimeRange::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::YearToDate => "YTD",
            TimeRange::OneYear => "1Y",
            TimeRange::All => "ALL",
        }
    }

    /// The earliest date kept by this range, `None` for `ALL`.
    ///
    /// Month arithmetic clamps to the end of shorter months (Mar 31 - 1M = Feb 29).
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeRange::OneWeek => today.checked_sub_days(Days::new(7)),
            TimeRange::OneMonth => today.checked_sub_months(Months::new(1)),
            TimeRange::ThreeMonths => today.checked_sub_months(Months::new(3)),
            TimeRange::SixMonths => today.checked_sub_months(Months::new(6)),
            TimeRange::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            TimeRange::OneYear => today.checked_sub_months(Months::new(12)),
            TimeRange::All => None,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TimeRange::ALL_RANGES
            .into_iter()
            .find(|range| range.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AnalyticsError::UnknownRange(s.to_string()))
    }
}

/// Keeps the points dated on or after the range's cutoff.
pub fn filter_range(series: &[PricePoint], range: TimeRange, today: NaiveDate) -> Vec<PricePoint> {
    match range.cutoff(today) {
        Some(cutoff) => series
            .iter()
            .filter(|point| point.date >= cutoff)
            .cloned()
            .collect(),
        None => series.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cutoffs_relative_to_today() {
        let today = date(2024, 3, 31);
        assert_eq!(TimeRange::OneWeek.cutoff(today), Some(date(2024, 3, 24)));
        assert_eq!(TimeRange::OneMonth.cutoff(today), Some(date(2024, 2, 29)));
        assert_eq!(TimeRange::ThreeMonths.cutoff(today), Some(date(2023, 12, 31)));
        assert_eq!(TimeRange::SixMonths.cutoff(today), Some(date(2023, 9, 30)));
        assert_eq!(TimeRange::YearToDate.cutoff(today), Some(date(2024, 1, 1)));
        assert_eq!(TimeRange::OneYear.cutoff(today), Some(date(2023, 3, 31)));
        assert_eq!(TimeRange::All.cutoff(today), None);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("ytd".parse::<TimeRange>().unwrap(), TimeRange::YearToDate);
        assert_eq!("1y".parse::<TimeRange>().unwrap(), TimeRange::OneYear);
        assert!(matches!(
            "2Y".parse::<TimeRange>(),
            Err(AnalyticsError::UnknownRange(_))
        ));
        assert_eq!(TimeRange::default(), TimeRange::OneYear);
    }

    #[test]
    fn filter_keeps_the_cutoff_day() {
        let today = date(2024, 3, 31);
        let series: Vec<PricePoint> = [date(2024, 3, 23), date(2024, 3, 24), date(2024, 3, 30)]
            .into_iter()
            .map(|d| PricePoint::new(d, 100.0, 0.0))
            .collect();

        let week = filter_range(&series, TimeRange::OneWeek, today);
        assert_eq!(week.len(), 2);
        assert_eq!(week[0].date, date(2024, 3, 24));
        assert_eq!(filter_range(&series, TimeRange::All, today).len(), 3);
    }
}
