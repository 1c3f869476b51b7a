//! # Bankdash Views
//!
//! The screens of the dashboard client, each an explicit state machine over a
//! `MarketApi`. Views own no rendering: they fetch, degrade and derive, and
//! expose the resulting `ViewState` for the binary to print.
//!
//! ## Concurrency
//!
//! Every fetch takes a `CancellationToken`. Independent requests are issued in
//! parallel and joined; a cancelled view drops its in-flight requests and never
//! applies a late result. Backend jobs are followed by a `LogPoller` task.

pub mod admin;
pub mod advisor;
pub mod cancel;
pub mod dashboard;
pub mod error;
pub mod explorer;
pub mod poller;

#[cfg(test)]
pub(crate) mod testing;

pub use admin::{AdminView, DEFAULT_MODEL, NO_TRAINING_RESULTS, ValidationReport, metrics_for};
pub use advisor::AdvisorView;
pub use cancel::with_cancel;
pub use dashboard::{DashboardData, DashboardView, resolve_dashboard_inputs};
pub use error::ViewError;
pub use explorer::{ExplorerData, ExplorerView, NO_FINANCIALS, NO_PRICE_HISTORY};
pub use poller::{LogPoller, PollHandle};
