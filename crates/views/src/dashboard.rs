use crate::cancel::with_cancel;
use analytics::{AnalyticsEngine, DashboardSnapshot};
use api_client::MarketApi;
use api_client::error::ApiError;
use api_client::fallback::{sample_history, sample_summary};
use chrono::{NaiveDate, Utc};
use core_types::{MarketSummary, PricePoint, Sourced, SymbolSelection};
use events::{ViewEvent, ViewState};
use rand::Rng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The summary cards and the derived analytics of the industry series.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub summary: MarketSummary,
    pub snapshot: DashboardSnapshot,
}

pub struct DashboardView {
    api: Arc<dyn MarketApi>,
    engine: AnalyticsEngine,
    fallback_days: usize,
    state: ViewState<DashboardData>,
}

impl DashboardView {
    pub fn new(api: Arc<dyn MarketApi>, engine: AnalyticsEngine, fallback_days: usize) -> Self {
        Self {
            api,
            engine,
            fallback_days,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState<DashboardData> {
        &self.state
    }

    /// Fetches the summary and the `ALL` history in parallel.
    ///
    /// The dashboard never ends in `Failed`: missing or broken data is
    /// replaced by labeled samples.
    pub async fn load(&mut self, token: &CancellationToken) -> &ViewState<DashboardData> {
        self.state.apply(ViewEvent::FetchStarted);

        let all = SymbolSelection::All;
        let fetched = with_cancel(token, async {
            tokio::join!(self.api.market_summary(), self.api.history(&all))
        })
        .await;

        let event = match fetched {
            Ok((summary, history)) => {
                let today = Utc::now().date_naive();
                let (summary, history) = resolve_dashboard_inputs(
                    summary,
                    history,
                    self.fallback_days,
                    today,
                    &mut rand::thread_rng(),
                );
                let origin = summary.origin.merge(history.origin);
                if origin.is_fallback() {
                    tracing::warn!(?origin, "Dashboard is showing sample data.");
                }
                let snapshot = self.engine.snapshot(history.data);
                ViewEvent::FetchSucceeded(Sourced {
                    data: DashboardData {
                        summary: summary.data,
                        snapshot,
                    },
                    origin,
                })
            }
            Err(_) => ViewEvent::Cancelled,
        };
        self.state.apply(event);
        &self.state
    }
}

/// Substitutes samples for whatever the backend could not provide.
///
/// Any fetch error replaces both datasets, so a live summary is never shown
/// next to a sample series. Empty mover lists and an empty history are
/// patched individually.
pub fn resolve_dashboard_inputs<R: Rng + ?Sized>(
    summary: Result<MarketSummary, ApiError>,
    history: Result<Vec<PricePoint>, ApiError>,
    fallback_days: usize,
    today: NaiveDate,
    rng: &mut R,
) -> (Sourced<MarketSummary>, Sourced<Vec<PricePoint>>) {
    let (mut summary, history) = match (summary, history) {
        (Ok(summary), Ok(history)) => (summary, history),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Dashboard fetch failed; falling back to sample data.");
            let reason = format!("backend unavailable: {e}");
            return (
                Sourced::fallback(sample_summary(), reason.clone()),
                Sourced::fallback(sample_history(fallback_days, today, rng), reason),
            );
        }
    };

    let sample = sample_summary();
    let mut patched = Vec::new();
    if summary.top_gainers.is_empty() {
        summary.top_gainers = sample.top_gainers;
        patched.push("top gainers");
    }
    if summary.top_losers.is_empty() {
        summary.top_losers = sample.top_losers;
        patched.push("top losers");
    }
    let summary = if patched.is_empty() {
        Sourced::live(summary)
    } else {
        Sourced::fallback(summary, format!("sample {}", patched.join(" and ")))
    };

    let history = if history.is_empty() {
        Sourced::fallback(
            sample_history(fallback_days, today, rng),
            "no price history from backend",
        )
    } else {
        Sourced::live(history)
    };

    (summary, history)
}
