pub mod enums;
pub mod error;
pub mod lenient;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AdvisorDirection, AdvisorRegime, DataOrigin, Regime, SymbolSelection};
pub use error::CoreError;
pub use structs::{
    AdminLogs, AdvisorReport, AdvisorSignals, FinancialRatio, JobAck, MarketSummary,
    ModelMetric, Mover, PricePoint, RegimeBucket, ReturnPoint, Sourced, ValidationRow,
    VolatilityPoint,
};
