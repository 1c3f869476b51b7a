//! Offline sample datasets for the dashboard.
//!
//! Callers must wrap these in `Sourced::fallback` so they are never shown as live data.

use chrono::{Days, NaiveDate};
use core_types::{MarketSummary, Mover, PricePoint};
use rand::Rng;

pub const SAMPLE_DATE: &str = "2025-01-10";
pub const SAMPLE_TOTAL_VOLUME: f64 = 125_000_000.0;
pub const DEFAULT_SAMPLE_DAYS: usize = 120;

const SAMPLE_START_CLOSE: f64 = 100.0;
/// Each sample day moves by at most this fraction either way.
const SAMPLE_MAX_DAILY_MOVE: f64 = 0.01;
const SAMPLE_MIN_VOLUME: f64 = 50_000_000.0;
const SAMPLE_VOLUME_SPREAD: f64 = 50_000_000.0;

const SAMPLE_GAINERS: [(&str, f64); 5] = [
    ("VCB", 2.8),
    ("ACB", 2.1),
    ("MBB", 1.9),
    ("CTG", 1.5),
    ("TCB", 1.2),
];
const SAMPLE_LOSERS: [(&str, f64); 5] = [
    ("VPB", -2.4),
    ("STB", -1.9),
    ("EIB", -1.4),
    ("HDB", -1.2),
    ("TPB", -0.8),
];

fn movers(entries: &[(&str, f64)]) -> Vec<Mover> {
    entries
        .iter()
        .map(|(symbol, change)| Mover {
            symbol: symbol.to_string(),
            change: *change,
        })
        .collect()
}

pub fn sample_summary() -> MarketSummary {
    MarketSummary {
        date: SAMPLE_DATE.to_string(),
        total_volume: SAMPLE_TOTAL_VOLUME,
        top_gainers: movers(&SAMPLE_GAINERS),
        top_losers: movers(&SAMPLE_LOSERS),
    }
}

/// A random walk of `days` consecutive calendar days ending on `today`.
pub fn sample_history<R: Rng + ?Sized>(
    days: usize,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<PricePoint> {
    let mut close = SAMPLE_START_CLOSE;
    let mut history = Vec::with_capacity(days);

    for offset in (0..days).rev() {
        let Some(date) = today.checked_sub_days(Days::new(offset as u64)) else {
            continue;
        };
        close *= 1.0 + rng.gen_range(-SAMPLE_MAX_DAILY_MOVE..SAMPLE_MAX_DAILY_MOVE);
        let volume = SAMPLE_MIN_VOLUME + rng.r#gen::<f64>() * SAMPLE_VOLUME_SPREAD;
        history.push(PricePoint::new(date, close, volume));
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sample_summary_has_five_movers_each_way() {
        let summary = sample_summary();
        assert_eq!(summary.top_gainers.len(), 5);
        assert_eq!(summary.top_losers.len(), 5);
        assert!(summary.top_gainers.iter().all(|m| m.change > 0.0));
        assert!(summary.top_losers.iter().all(|m| m.change < 0.0));
        assert_eq!(summary.total_volume, SAMPLE_TOTAL_VOLUME);
    }

    #[test]
    fn sample_history_is_a_bounded_daily_walk_ending_today() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let history = sample_history(DEFAULT_SAMPLE_DAYS, today, &mut rng);

        assert_eq!(history.len(), DEFAULT_SAMPLE_DAYS);
        assert_eq!(history.last().map(|p| p.date), Some(today));
        assert!(history.windows(2).all(|w| (w[1].date - w[0].date).num_days() == 1));

        let mut prev = SAMPLE_START_CLOSE;
        for point in &history {
            assert!((point.close / prev - 1.0).abs() <= SAMPLE_MAX_DAILY_MOVE + 1e-12);
            assert!((SAMPLE_MIN_VOLUME..=SAMPLE_MIN_VOLUME + SAMPLE_VOLUME_SPREAD).contains(&point.volume));
            prev = point.close;
        }
    }

    #[test]
    fn zero_days_is_empty() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert!(sample_history(0, today, &mut StdRng::seed_from_u64(1)).is_empty());
    }
}
