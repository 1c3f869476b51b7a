use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Window size must be at least 1, got {0}")]
    InvalidWindow(usize),

    #[error("Regime thresholds are inverted: up {up} must be greater than down {down}")]
    InvalidThresholds { up: f64, down: f64 },

    #[error("Unknown time range '{0}' (expected 1W, 1M, 3M, 6M, YTD, 1Y or ALL)")]
    UnknownRange(String),
}
